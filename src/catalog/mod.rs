mod raw_materials;
mod resources;

use axum::{routing::get, Router};
use serde::Deserialize;

pub use raw_materials::RawMaterial;
pub use resources::Resource;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub(crate) struct CatalogQuery {
    q: Option<String>,
    category: Option<String>,
}

pub fn resources_router() -> Router<AppState> {
    Router::new()
        .route("/", get(resources::list_resources).post(resources::create_resource))
        .route("/{id}", get(resources::resource))
        .route("/{id}/view", get(resources::view_resource))
}

pub fn raw_materials_router() -> Router<AppState> {
    Router::new()
        .route("/", get(raw_materials::list_raw_materials).post(raw_materials::create_raw_material))
        .route("/{id}", get(raw_materials::raw_material))
}
