use cache_hierarchy_sim::config::Config;
use cache_hierarchy_sim::run_simulation;
use clap::Parser;
use std::process;

fn init_msg() {
    println!("cache hierarchy simulation");
}

fn main() {
    init_msg();
    let config = Config::parse();
    config.display();
    config.validate();
    println!();
    if let Err(error) = run_simulation(&config) {
        eprintln!("error: {}", error);
        process::exit(1);
    }
}
