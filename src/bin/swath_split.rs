use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    swath_split::app::init_tracing();
    swath_split::app::run_split_archives(std::env::args().skip(1))
}
