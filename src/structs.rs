use clap::Parser;

#[derive(Parser, Debug)]
#[clap(name = "station-booking")]
#[clap(version = "0.1.0")]
#[clap(about = "train station ticketing backend", long_about = None)]
pub struct Args {
    #[clap(short, long, default_value_t = String::from("127.0.0.1"))]
    pub host: String,

    #[clap(short, long, default_value_t = 8080)]
    pub port: u16,

    #[clap(short, long, action)]
    pub verbose: bool,
}
