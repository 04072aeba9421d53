use std::io::Write;

use maat::create::{create_evaluation_cases, create_test_cases, create_training_text, training_text};
use serde::Serialize;
use termcolor::Color;

use crate::{
    cli::CasesArgs,
    config::{Config, Format},
    shell::Shell,
};

use super::utils;

/// One line of `--format json` output.
#[derive(Debug, Serialize)]
struct CaseRecord<'a> {
    block: usize,
    index: usize,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    mask_len: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    alternatives: Option<&'a [String]>,
}

pub fn cases(shell: &mut Shell, mut config: Config, args: CasesArgs) -> anyhow::Result<()> {
    config.apply(&args.input);
    if let Some(format) = args.format {
        config.format = format;
    }

    let mut stdout = std::io::stdout().lock();
    let mut total = 0;

    for (block, mut doc) in utils::convert_file(shell, &config, &args.input.path)?
        .into_iter()
        .enumerate()
    {
        if args.evaluation {
            for (index, case) in create_evaluation_cases(&doc)?.iter().enumerate() {
                let record = CaseRecord {
                    block,
                    index,
                    text: &case.text,
                    mask_len: Some(case.mask_len),
                    alternatives: Some(&case.alternatives),
                };
                write_record(&mut stdout, config.format, &record)?;
                total += 1;
            }
        } else {
            create_training_text(&mut doc)?;
            for (index, case) in create_test_cases(&training_text(&doc)).enumerate() {
                let record = CaseRecord {
                    block,
                    index,
                    text: &case,
                    mask_len: None,
                    alternatives: None,
                };
                write_record(&mut stdout, config.format, &record)?;
                total += 1;
            }
        }
    }

    stdout.flush()?;
    shell.status_with_color("Masked", format!("{total} test case(s)"), Color::Cyan)?;

    Ok(())
}

fn write_record(out: &mut impl Write, format: Format, record: &CaseRecord<'_>) -> anyhow::Result<()> {
    match format {
        Format::Text => writeln!(out, "{}", record.text)?,
        Format::Json => {
            serde_json::to_writer(&mut *out, record)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
