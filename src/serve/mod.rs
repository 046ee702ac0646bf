mod error;

use crate::batch::{fetch_conversations, parse_tweet_ids};
use crate::twitter::ConversationSource;
use actix_web::http::StatusCode;
use actix_web::web::{Data, Query, ServiceConfig};
use actix_web::{get, App, HttpResponse, HttpServer};
use anyhow::Context;
use error::{HttpError, IntoHttpError};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;

#[derive(Deserialize)]
struct TweetQuery {
    #[serde(default)]
    tweet_ids: String,
}

#[get("/tweet")]
async fn tweet(
    source: Data<dyn ConversationSource>,
    query: Query<TweetQuery>,
) -> Result<HttpResponse, HttpError> {
    let ids = parse_tweet_ids(&query.tweet_ids)?;
    let conversation = fetch_conversations(source.get_ref(), &ids).await?;
    let body = serde_json::to_value(&conversation).map_500()?;
    Ok(HttpResponse::build(StatusCode::OK).json(body))
}

fn configure(cfg: &mut ServiceConfig) {
    cfg.service(tweet);
}

pub async fn serve(source: Arc<dyn ConversationSource>, socket: SocketAddr) -> anyhow::Result<()> {
    let source = Data::from(source);
    let server = HttpServer::new(move || App::new().app_data(source.clone()).configure(configure))
        .bind(socket)?
        .run();
    log::info!("Listening on http://{}/tweet", socket);
    server.await.context("Unable to run HTTP server")?;
    Ok(())
}
