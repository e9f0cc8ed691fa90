//! Mapping between PDF-page space and scene space.
//!
//! Both directions are independent linear scalings per axis. Pages are assumed
//! unrotated; no DPI correction is applied beyond the scale implied by the scene size.

use crate::error::{EditorError, EditorResult};
use crate::geometry::{PageSize, PdfPoint, PdfRect, SceneRect, ScenePoint, SceneSize};

fn check_sizes(page: PageSize, scene: SceneSize) -> EditorResult<()> {
    if scene.is_degenerate() {
        return Err(EditorError::InvalidState(format!(
            "scene has no extent ({} x {}); render a page before mapping coordinates",
            scene.width, scene.height
        )));
    }
    if !(page.width > 0.0 && page.height > 0.0) {
        return Err(EditorError::InvalidState(format!(
            "page has no extent ({} x {})",
            page.width, page.height
        )));
    }
    Ok(())
}

/// Map a page point to scene pixels.
pub fn to_scene(point: PdfPoint, page: PageSize, scene: SceneSize) -> EditorResult<ScenePoint> {
    check_sizes(page, scene)?;
    Ok(ScenePoint::new(
        point.x * scene.width / page.width,
        point.y * scene.height / page.height,
    ))
}

/// Map scene pixels back to a page point.
pub fn to_pdf(point: ScenePoint, page: PageSize, scene: SceneSize) -> EditorResult<PdfPoint> {
    check_sizes(page, scene)?;
    Ok(PdfPoint::new(
        point.x * page.width / scene.width,
        point.y * page.height / scene.height,
    ))
}

pub fn to_scene_rect(rect: PdfRect, page: PageSize, scene: SceneSize) -> EditorResult<SceneRect> {
    Ok(SceneRect {
        min: to_scene(rect.top_left(), page, scene)?,
        max: to_scene(rect.bottom_right(), page, scene)?,
    })
}

pub fn to_pdf_rect(rect: SceneRect, page: PageSize, scene: SceneSize) -> EditorResult<PdfRect> {
    let min = to_pdf(rect.min, page, scene)?;
    let max = to_pdf(rect.max, page, scene)?;
    Ok(PdfRect::new(min.x, min.y, max.x, max.y))
}
