use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use catbayes::{Accuracy, ClassifierConfig, Command, CommandOutcome, Session, TieBreak};
use clap::Parser;
use log::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Metadata file declaring the attributes and the class line
    #[arg(short, long)]
    metadata: PathBuf,

    /// Labeled training data
    #[arg(short, long)]
    train: PathBuf,

    /// Data to classify, with or without a trailing class column
    #[arg(long, requires = "output")]
    test: Option<PathBuf>,

    /// Where to write one `<record> / <prediction>` line per test record
    #[arg(short, long, requires = "test")]
    output: Option<PathBuf>,

    /// Which class wins when scores are exactly equal
    #[arg(long, value_enum, default_value_t = TieBreak::Last)]
    tie_break: TieBreak,

    /// Print the learned priors and likelihoods after training
    #[arg(long)]
    show_model: bool,

    /// Print the test report as JSON instead of text
    #[arg(long)]
    json: bool,
}

impl Args {
    fn commands(&self) -> Vec<Command> {
        let mut commands = vec![
            Command::LoadMetadata(self.metadata.clone()),
            Command::Train(self.train.clone()),
        ];
        if let (Some(input), Some(output)) = (&self.test, &self.output) {
            commands.push(Command::Test {
                input: input.clone(),
                output: output.clone(),
            });
        }
        commands
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = ClassifierConfig::default().with_tie_break(args.tie_break);
    let mut session = Session::new(config);
    let start_time = Instant::now();

    for command in args.commands() {
        let description = format!("{:?}", command);
        let outcome = session
            .dispatch(command)
            .with_context(|| format!("{} failed", description))?;
        render(&session, &args, outcome)?;
    }

    info!("Done in {:.2?}", start_time.elapsed());
    Ok(())
}

fn render(session: &Session, args: &Args, outcome: CommandOutcome) -> anyhow::Result<()> {
    match outcome {
        CommandOutcome::MetadataLoaded(schema) => {
            println!(
                "***** Metadata successfully loaded: {} attributes, {} classes *****",
                schema.num_attributes(),
                schema.num_classes()
            );
        }
        CommandOutcome::Trained(summary) => {
            println!(
                "***** Model successfully trained on {} records *****",
                summary.records_used
            );
            for failure in &summary.rejected {
                eprintln!("  skipped line {}: {}", failure.line_number, failure.error);
            }
            if args.show_model {
                if let Some(classifier) = session.classifier() {
                    print!("{}", classifier.describe());
                }
            }
        }
        CommandOutcome::Tested(report) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }

            println!("{} instances in the test data", report.total_records);
            match report.accuracy {
                Accuracy::Available { correct, total } => {
                    println!("{} correctly classified", correct);
                    println!(
                        "Accuracy = {}/{} ({:.1}%)",
                        correct,
                        total,
                        report.accuracy.ratio().unwrap_or(0.0) * 100.0
                    );
                }
                Accuracy::Unavailable => {
                    println!("No classifications were given for the test file, so we cannot report on accuracy");
                }
            }
            for failure in &report.failures {
                eprintln!("  could not classify line {}: {}", failure.line_number, failure.error);
            }
        }
        CommandOutcome::Reset => println!("Naive Bayes Classifier successfully reset"),
    }
    Ok(())
}
