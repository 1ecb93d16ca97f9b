use std::error::Error;

use log::{debug, initialize_logger};
use structopt::StructOpt;

use backend::isbn::Isbn;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "check-isbn",
    about = "Validate ISBNs and print their normalized form"
)]
struct Opt {
    /// The ISBNs to check; hyphens and spaces are allowed
    #[structopt(required = true)]
    isbns: Vec<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let opt = Opt::from_args();

    let logger = initialize_logger();
    debug!(logger, "Checking {} ISBNs...", opt.isbns.len());

    let mut invalid = 0;

    for raw in &opt.isbns {
        match Isbn::parse(raw) {
            Ok(isbn) => println!("{}\t{}\t{:?}", raw, isbn, isbn.kind()),
            Err(e) => {
                invalid += 1;
                println!("{}\t{}", raw, e);
            }
        }
    }

    if invalid > 0 {
        return Err(format!("{} of {} ISBNs are invalid", invalid, opt.isbns.len()).into());
    }

    Ok(())
}
