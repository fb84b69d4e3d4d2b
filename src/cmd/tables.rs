//! Tables command - print the poverty guidelines and applicable figures in use

use clap::{Args, ValueEnum};
use ptc::{ApplicableRateTable, PovertyGuidelineRegistry, ResidencyCategory};
use tabled::{
    builder::Builder,
    settings::{object::Columns, Alignment, Modify, Style},
};

#[derive(Args, Debug)]
pub struct TablesCommand {
    /// Only show the poverty guidelines for this residency
    #[arg(short, long, value_enum)]
    state: Option<StateArg>,

    /// Largest household size to list (sizes past the table are extrapolated)
    #[arg(long, default_value_t = 8)]
    sizes: u32,

    /// Also print the applicable figure table (line 7)
    #[arg(long)]
    figures: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StateArg {
    /// 48 contiguous states and DC
    Contiguous,
    Alaska,
    Hawaii,
}

impl From<StateArg> for ResidencyCategory {
    fn from(arg: StateArg) -> Self {
        match arg {
            StateArg::Contiguous => ResidencyCategory::Contiguous48AndDc,
            StateArg::Alaska => ResidencyCategory::Alaska,
            StateArg::Hawaii => ResidencyCategory::Hawaii,
        }
    }
}

impl TablesCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let categories: Vec<ResidencyCategory> = match self.state {
            Some(state) => vec![state.into()],
            None => ResidencyCategory::ALL.to_vec(),
        };
        self.print_guidelines(&categories)?;

        if self.figures {
            println!();
            self.print_figures();
        }
        Ok(())
    }

    fn print_guidelines(&self, categories: &[ResidencyCategory]) -> anyhow::Result<()> {
        let registry = PovertyGuidelineRegistry::tax_year_2022();

        let mut builder = Builder::default();
        let mut header = vec!["Household size".to_string()];
        header.extend(categories.iter().map(|c| c.to_string()));
        builder.push_record(header);

        for size in 1..=self.sizes {
            let mut record = vec![size.to_string()];
            for category in categories {
                record.push(registry.lookup(*category, size)?.to_string());
            }
            builder.push_record(record);
        }

        println!("FEDERAL POVERTY GUIDELINES (line 4)");
        let table = builder
            .build()
            .with(Style::rounded())
            .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);

        for category in categories {
            let table = registry.table(*category)?;
            println!(
                "{}: add {} for each person beyond {}",
                category,
                table.extra_person_increment(),
                table.max_tabulated_size()
            );
        }
        Ok(())
    }

    fn print_figures(&self) {
        let rates = ApplicableRateTable::tax_year_2022();

        let mut builder = Builder::default();
        builder.push_record(["Percent of poverty line", "Applicable figure"]);
        builder.push_record([
            format!("less than {}", rates.min_percent()),
            format!("{:.4}", rates.lookup(rates.min_percent())),
        ]);
        for (percent, figure) in rates.entries() {
            builder.push_record([percent.to_string(), format!("{:.4}", figure)]);
        }
        builder.push_record([
            format!("over {}", rates.max_percent()),
            format!("{:.4}", rates.lookup(rates.max_percent())),
        ]);

        println!("APPLICABLE FIGURE TABLE (line 7)");
        let table = builder
            .build()
            .with(Style::rounded())
            .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
    }
}
