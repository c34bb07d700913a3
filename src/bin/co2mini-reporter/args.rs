use clap::Parser;

#[derive(Debug, Parser)]
pub struct Args {
    /// Broker address, e.g. tcp://192.168.0.1:1883. Omit to skip publishing.
    #[arg(long, env = "MQTT_SERVER")]
    pub server: Option<String>,

    /// Base topic; the values go to <topic>/temperature and <topic>/co2.
    #[arg(long, default_value = "dadget/room")]
    pub topic: String,

    #[arg(long, env = "MQTT_USER")]
    pub user: Option<String>,

    #[arg(long, env = "MQTT_PASSWORD")]
    pub password: Option<String>,

    /// How long to wait for a complete reading before giving up.
    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,
}
