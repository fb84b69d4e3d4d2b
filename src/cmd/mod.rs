pub mod calc;
pub mod schema;
pub mod tables;

use anyhow::Context;
use ptc::{FormInput, Month, MonthlyRowInput};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Read form input (JSON) from a file, or stdin with "-"
pub fn read_form(path: &Path) -> anyhow::Result<FormInput> {
    if path.as_os_str() == "-" {
        read_from_stdin()
    } else {
        let file =
            File::open(path).with_context(|| format!("opening {}", path.display()))?;
        ptc::read_form_json(BufReader::new(file))
            .with_context(|| format!("reading {}", path.display()))
    }
}

fn read_from_stdin() -> anyhow::Result<FormInput> {
    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin.lock());

    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;

    if buffer.is_empty() {
        anyhow::bail!("No input received. Provide a file or pipe data to stdin.");
    }

    ptc::read_form_json(io::Cursor::new(buffer))
}

/// Read monthly rows (CSV) from a file
pub fn read_monthly(path: &Path) -> anyhow::Result<BTreeMap<Month, MonthlyRowInput>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    ptc::read_monthly_csv(BufReader::new(file))
        .with_context(|| format!("reading {}", path.display()))
}

pub fn write_csv<I, R, W>(records: I, writer: W) -> anyhow::Result<()>
where
    I: IntoIterator<Item = R>,
    R: serde::Serialize,
    W: io::Write,
{
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records.into_iter() {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}
