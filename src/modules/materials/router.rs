use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};

use super::controller::{
    create_material, delete_material, list_materials, update_material, upload_material,
};
use crate::state::AppState;

/// Multipart framing on top of the file itself.
const UPLOAD_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn init_materials_router(max_file_size: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/modules/{id}/materials",
            get(list_materials).post(create_material),
        )
        .route(
            "/modules/{id}/materials/upload",
            post(upload_material)
                .layer(DefaultBodyLimit::max(max_file_size + UPLOAD_OVERHEAD_BYTES)),
        )
        .route(
            "/materials/{id}",
            put(update_material).delete(delete_material),
        )
}
