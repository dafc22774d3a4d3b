use std::io::{BufRead, Write};

use comfy_table::{Cell, Table};

use crate::form::client::{ApplicationClient, FAILURE_NOTICE, Outcome};
use crate::form::{ApplicationForm, Field, FieldError, FormError, Step};
use crate::submission::ApplicationPayload;

pub async fn apply(server: &str, community_url: &str) -> anyhow::Result<()> {
    let client = ApplicationClient::new(server, community_url)?;

    let payload = {
        let stdin = std::io::stdin();
        let mut input = stdin.lock();
        let mut output = std::io::stdout();
        run_wizard(&mut input, &mut output)?
    };

    let Some(payload) = payload else {
        println!("Application cancelled.");
        return Ok(());
    };

    match client.submit(&payload).await {
        Ok(outcome) => {
            println!("{}", outcome.notice());
            if let Outcome::Accepted { redirect } = outcome {
                println!("Join the community: {redirect}");
            }
        }
        Err(e) => {
            tracing::error!("Submitting to {} failed: {e}", client.endpoint());
            println!("{FAILURE_NOTICE}");
        }
    }
    Ok(())
}

/// Walk the applicant through both steps. Returns `None` if they cancel or input ends.
pub fn run_wizard<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> anyhow::Result<Option<ApplicationPayload>> {
    let mut form = ApplicationForm::new();

    loop {
        let step = form.step();
        writeln!(output, "\n--- {step} ---")?;
        for field in step.fields() {
            if !prompt_field(&mut form, *field, input, output)? {
                return Ok(None);
            }
        }

        match step {
            Step::Details => match form.advance() {
                Ok(_) => {}
                Err(FormError::Invalid(errors)) => write_errors(output, &errors)?,
                Err(e) => return Err(e.into()),
            },
            Step::Motivation => {
                writeln!(output, "\n{}", review_table(&form))?;
                write!(output, "Submit application? [y = submit, b = back, n = cancel]: ")?;
                output.flush()?;
                let Some(answer) = read_line(input)? else {
                    return Ok(None);
                };
                match answer.to_ascii_lowercase().as_str() {
                    "y" | "yes" => match form.submit() {
                        Ok(payload) => return Ok(Some(payload)),
                        Err(FormError::Invalid(errors)) => write_errors(output, &errors)?,
                        Err(e) => return Err(e.into()),
                    },
                    "b" | "back" => {
                        form.back();
                    }
                    _ => return Ok(None),
                }
            }
        }
    }
}

/// Ask for one field until it takes. An empty answer keeps the current value.
fn prompt_field<R: BufRead, W: Write>(
    form: &mut ApplicationForm,
    field: Field,
    input: &mut R,
    output: &mut W,
) -> anyhow::Result<bool> {
    loop {
        write!(output, "{}", field.label())?;
        if let Some(choices) = field.choices() {
            write!(output, " ({})", choices.join(" / "))?;
        }
        if let Some(current) = form.value(field) {
            write!(output, " [{current}]")?;
        }
        write!(output, ": ")?;
        output.flush()?;

        let Some(answer) = read_line(input)? else {
            return Ok(false);
        };
        if answer.is_empty() {
            return Ok(true);
        }

        match form.set(field, &answer) {
            Ok(()) => return Ok(true),
            Err(e @ FormError::InvalidChoice { .. }) => writeln!(output, "  {e}")?,
            Err(e) => return Err(e.into()),
        }
    }
}

fn read_line<R: BufRead>(input: &mut R) -> anyhow::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn write_errors<W: Write>(output: &mut W, errors: &[FieldError]) -> anyhow::Result<()> {
    for e in errors {
        writeln!(output, "  {}: {}", e.field.label(), e.message)?;
    }
    Ok(())
}

fn review_table(form: &ApplicationForm) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Field", "Answer"]);
    for field in Step::Details.fields().iter().chain(Step::Motivation.fields()) {
        table.add_row(vec![
            Cell::new(field.label()),
            Cell::new(form.value(*field).unwrap_or("-")),
        ]);
    }
    table
}
