use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    pretext::example_apps::run_create_pretraining(std::env::args().skip(1))
}
