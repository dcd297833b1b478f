use actix_web::{
    get, middleware, web::Data, App, HttpRequest, HttpResponse, HttpServer, Responder,
};
use clap::Parser;
use controller::api::flink_session_cluster::FlinkSessionCluster;
use controller::config::Config;
use controller::{telemetry, State};
use kube::CustomResourceExt;
use prometheus::{Encoder, TextEncoder};

/// Controller converging Flink session clusters
#[derive(Parser, Debug)]
#[command(name = "flink-session-operator", version, about, long_about = None)]
struct Cli {
    /// Print the FlinkSessionCluster CRD manifest and exit
    #[arg(long)]
    crd: bool,

    #[command(flatten)]
    config: Config,
}

#[get("/metrics")]
async fn metrics(c: Data<State>, _req: HttpRequest) -> impl Responder {
    let metrics = c.metrics();
    let encoder = TextEncoder::new();
    let mut buffer = vec![];
    match encoder.encode(&metrics, &mut buffer) {
        Ok(()) => HttpResponse::Ok().body(buffer),
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

#[get("/health")]
async fn health(_: HttpRequest) -> impl Responder {
    HttpResponse::Ok().json("healthy")
}

#[get("/")]
async fn index(c: Data<State>, _req: HttpRequest) -> impl Responder {
    let d = c.diagnostics().await;
    HttpResponse::Ok().json(&d)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if cli.crd {
        print!("{}", serde_yaml::to_string(&FlinkSessionCluster::crd())?);
        return Ok(());
    }

    telemetry::init()?;

    // Init k8s controller state
    let state = State::default();
    let bind_address = cli.config.bind_address.clone();
    let cluster_controller = controller::run(state.clone(), cli.config);

    // Start web server
    let server = HttpServer::new(move || {
        App::new()
            .app_data(Data::new(state.clone()))
            .wrap(middleware::Logger::default().exclude("/health"))
            .service(index)
            .service(health)
            .service(metrics)
    })
    .bind(bind_address)?
    .shutdown_timeout(5)
    .run();

    let (controller, server) = tokio::join!(cluster_controller, server);
    controller?;
    server?;
    Ok(())
}
