use salvo::prelude::*;

use crate::utils;

use super::get_state;

/// GET /images/{name} - Serve a stored temp image
#[handler]
pub async fn get_image(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<(), StatusError> {
    let name: String = req.param("name").ok_or_else(StatusError::bad_request)?;
    if !utils::is_safe_image_name(&name) {
        return Err(StatusError::bad_request().brief("invalid image name"));
    }

    let state = get_state(depot)?;
    let path = state.config.temp_image_dir.join(&name);
    let data = tokio::fs::read(&path)
        .await
        .map_err(|_| StatusError::not_found())?;

    res.headers_mut()
        .insert("Content-Type", utils::content_type_for(&name).parse().unwrap());
    res.write_body(data).ok();
    Ok(())
}
