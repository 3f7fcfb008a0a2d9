use std::num::NonZeroUsize;

use actix_web::middleware::Logger;
use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use dotenv::dotenv;
use log::{error, info};
use lru::LruCache;
use parking_lot::Mutex;

use rust_kmst::config::ServerConfig;
use rust_kmst::models::{KmstRequest, KmstResponse};
use rust_kmst::solve::solve_request;
use rust_kmst::{create_solver, KmstError, SolveOptions, Solver};

struct AppState {
    solver: Box<dyn Solver>,
    defaults: SolveOptions,
    /// Responses keyed by the serialized request
    cache: Option<Mutex<LruCache<String, KmstResponse>>>,
}

fn error_response(err: &KmstError) -> HttpResponse {
    let body = serde_json::json!({ "error": err.to_string() });
    match err {
        KmstError::InvalidInput(_) => HttpResponse::BadRequest().json(body),
        _ => {
            error!("Solve failed: {}", err);
            HttpResponse::InternalServerError().json(body)
        }
    }
}

// ---------- Route handlers ----------

/// POST /kmst
async fn kmst(state: web::Data<AppState>, req: web::Json<KmstRequest>) -> impl Responder {
    let req = req.into_inner();
    let cache_key = serde_json::to_string(&req).ok();

    if let (Some(cache), Some(key)) = (&state.cache, &cache_key) {
        let hit = cache.lock().get(key).cloned();
        if let Some(response) = hit {
            info!("Serving k-MST result from cache");
            return HttpResponse::Ok().json(response);
        }
    }

    // Solving blocks; keep it off the async workers
    let worker_state = state.clone();
    let result = web::block(move || {
        solve_request(worker_state.solver.as_ref(), &worker_state.defaults, &req)
    })
    .await;

    match result {
        Ok(Ok(response)) => {
            if let (Some(cache), Some(key)) = (&state.cache, cache_key) {
                if response.is_cacheable() {
                    cache.lock().put(key, response.clone());
                }
            }
            HttpResponse::Ok().json(response)
        }
        Ok(Err(err)) => error_response(&err),
        Err(err) => {
            error!("Solver worker failed: {}", err);
            HttpResponse::InternalServerError()
                .json(serde_json::json!({ "error": "Something went wrong" }))
        }
    }
}

/// GET /health
async fn health_check() -> impl Responder {
    HttpResponse::Ok().body("OK")
}

/// GET /docs
async fn docs() -> impl Responder {
    let docs_html = include_str!("../static/docs.html");
    HttpResponse::Ok()
        .content_type("text/html")
        .body(docs_html)
}

/// GET / - Redirect to docs
async fn root_redirect() -> impl Responder {
    HttpResponse::Found()
        .append_header(("Location", "/docs"))
        .finish()
}

// ---------- Server bootstrap ----------
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;

    let _sentry = config.sentry_dsn.as_deref().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let solver = create_solver(config.solver_type);
    info!(
        "Using {} (gap {}, time limit {:?}, cache size {})",
        solver.name(),
        config.solve_options.tolerance_gap,
        config.solve_options.time_limit,
        config.cache_size,
    );

    let state = web::Data::new(AppState {
        solver,
        defaults: config.solve_options.clone(),
        cache: NonZeroUsize::new(config.cache_size).map(|cap| Mutex::new(LruCache::new(cap))),
    });

    let json_limit = config.json_limit;
    info!("Starting server on http://127.0.0.1:{}", config.port);
    HttpServer::new(move || {
        App::new()
            .wrap(sentry_actix::Sentry::new())
            .wrap(Logger::default())
            .app_data(state.clone())
            .app_data(
                web::JsonConfig::default()
                    .limit(json_limit)
                    .error_handler(|err, _| {
                        let err_string = err.to_string();
                        actix_web::error::InternalError::from_response(
                            err,
                            HttpResponse::BadRequest()
                                .json(serde_json::json!({ "error": err_string })),
                        )
                        .into()
                    }),
            )
            .route("/", web::get().to(root_redirect))
            .route("/kmst", web::post().to(kmst))
            .route("/health", web::get().to(health_check))
            .route("/docs", web::get().to(docs))
    })
    .bind(("0.0.0.0", config.port))?
    .run()
    .await
}
