use salvo::cors::*;
use salvo::prelude::*;

use crate::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .hoop(affix_state::inject(state))
        .hoop(
            Cors::new()
                .allow_origin(AllowOrigin::any())
                .allow_methods(AllowMethods::any())
                .allow_headers(AllowHeaders::any())
                .into_handler(),
        )
        // Health & model status
        .push(Router::with_path("health").get(handlers::health::health))
        .push(Router::with_path("api/models").get(handlers::health::list_models))
        // VQA endpoints
        .push(Router::with_path("api/upload").post(handlers::vqa::upload_image))
        .push(Router::with_path("api/url").post(handlers::vqa::answer_from_url))
        // Stored temp images
        .push(Router::with_path("images/{name}").get(handlers::images::get_image))
}
