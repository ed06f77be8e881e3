use chrono::Utc;
use clap::{crate_version, value_t, App, Arg};
use log::{debug, info};
use tokio::net::UdpSocket;

use csm_receiver::config::DEFAULT_ADDR;
use csm_receiver::Event;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init();
    let matches = App::new("emitter")
        .version(crate_version!())
        .about("Sends synthetic CSM events to a receiver")
        .arg(Arg::with_name("addr").short("a").long("addr").default_value(DEFAULT_ADDR))
        .arg(Arg::with_name("count").short("n").long("count").default_value("1"))
        .arg(Arg::with_name("api").long("api").default_value("ListRoles"))
        .arg(Arg::with_name("service").long("service").default_value("IAM"))
        .arg(Arg::with_name("region").long("region").default_value("eu-central-1"))
        .get_matches();

    let target = matches.value_of("addr").unwrap_or(DEFAULT_ADDR);
    let count = value_t!(matches, "count", u32).unwrap_or_else(|e| e.exit());
    let template = Event {
        event_type: "ApiCall".to_owned(),
        api: matches.value_of("api").unwrap_or_default().to_owned(),
        service: matches.value_of("service").unwrap_or_default().to_owned(),
        region: matches.value_of("region").unwrap_or_default().to_owned(),
        user_agent: concat!("csm-receiver-emitter/", env!("CARGO_PKG_VERSION")).to_owned(),
        version: 1,
        attempts: 1,
        http_status_code: 200,
        final_http_status_code: 200,
        ..Event::default()
    };

    let mut socket = UdpSocket::bind("0.0.0.0:0").await?;
    socket.connect(target).await?;

    for n in 0..count {
        let started = Utc::now();
        let event = Event {
            request_id: format!("emitter-{}-{}", started.timestamp_millis(), n),
            timestamp: started.timestamp_millis(),
            latency: 10 + i64::from(n % 90),
            ..template.clone()
        };
        let payload = serde_json::to_vec(&event)?;
        socket.send(&payload).await?;
        debug!("sent {} ({} bytes)", event.request_id, payload.len());
    }

    info!("Sent {} events to {}", count, target);
    Ok(())
}
