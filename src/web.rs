use std::convert::Infallible;
use std::net::SocketAddr;

use async_graphql_warp::{GraphQLBadRequest, GraphQLResponse};
use warp::{http::StatusCode, Filter, Rejection, Reply};

use crate::api::Schema;

/// Serve the GraphQL schema at `/graphql` until the process exits.
pub async fn serve(schema: Schema, addr: SocketAddr) {
    let graphql = warp::path("graphql").and(async_graphql_warp::graphql(schema)).and_then(
        |(schema, request): (Schema, async_graphql::Request)| async move {
            Ok::<_, Infallible>(GraphQLResponse::from(schema.execute(request).await))
        },
    );

    let routes = graphql.recover(handle_rejection);
    warp::serve(routes).run(addr).await;
}

async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    if let Some(GraphQLBadRequest(err)) = err.find() {
        return Ok(warp::reply::with_status(
            err.to_string(),
            StatusCode::BAD_REQUEST,
        ));
    }
    Ok(warp::reply::with_status(
        "NOT_FOUND".to_string(),
        StatusCode::NOT_FOUND,
    ))
}
