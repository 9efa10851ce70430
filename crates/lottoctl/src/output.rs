use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum Format {
    Json,
    #[default]
    PlainText,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Output {
    format: Format,
}

/// Anything a command wants to show the user: machine shape via serde,
/// human shape via `report`.
pub trait Report {
    fn report(&self);
}

impl Output {
    pub const fn new(format: Format) -> Self {
        Self { format }
    }

    pub fn write<T: Serialize + Report>(&self, value: &T) {
        match self.format {
            Format::Json => match serde_json::to_string(&value) {
                Ok(json) => println!("{json}"),
                Err(err) => eprintln!("failed to serialize to JSON: {err}"),
            },
            Format::PlainText => value.report(),
        }
    }
}
