use super::*;

pub(super) fn document() -> Result<web_sys::Document, String> {
    web_sys::window()
        .ok_or_else(|| "window is unavailable".to_string())?
        .document()
        .ok_or_else(|| "document is unavailable".to_string())
}

pub(super) fn ensure_stylesheet() -> Result<(), String> {
    let document = document()?;
    if document.get_element_by_id(STYLESHEET_ID).is_some() {
        return Ok(());
    }
    let head = document
        .head()
        .ok_or_else(|| "document head is unavailable".to_string())?;
    let style = document
        .create_element("style")
        .map_err(|_| "failed to create responsive stylesheet".to_string())?;
    style.set_id(STYLESHEET_ID);
    style.set_text_content(Some(&responsive_stylesheet()));
    head.append_child(&style)
        .map_err(|_| "failed to append responsive stylesheet".to_string())?;
    Ok(())
}

/// Replaces the rendered shell with `output`; `Empty` leaves the mount point blank.
pub(super) fn mount_output(output: &ShellOutput) -> Result<(), String> {
    let document = document()?;
    if let Some(existing) = document.get_element_by_id(ROOT_ID) {
        existing.remove();
    }
    let Some(spec) = render_output(output) else {
        return Ok(());
    };

    let mount_point: Node = match document.get_element_by_id(MOUNT_POINT_ID) {
        Some(element) => element.into(),
        None => document
            .body()
            .ok_or_else(|| "document body is unavailable".to_string())?
            .into(),
    };
    let root = materialize(&document, &spec)?;
    mount_point
        .append_child(&root)
        .map_err(|_| "failed to append dashboard root".to_string())?;
    Ok(())
}

fn materialize(document: &web_sys::Document, spec: &ElementSpec) -> Result<Element, String> {
    let element = document
        .create_element(spec.tag)
        .map_err(|_| format!("failed to create <{}> element", spec.tag))?;
    if let Some(id) = spec.id {
        element.set_id(id);
    }
    if !spec.classes.is_empty() {
        element.set_class_name(&spec.classes.join(" "));
    }
    for (name, value) in &spec.attributes {
        element
            .set_attribute(name, value)
            .map_err(|_| format!("failed to set {name} on <{}>", spec.tag))?;
    }
    if !spec.style.is_empty() {
        let html = element
            .dyn_ref::<HtmlElement>()
            .ok_or_else(|| format!("<{}> is not an HtmlElement", spec.tag))?;
        for (property, value) in &spec.style {
            html.style()
                .set_property(property, value)
                .map_err(|_| format!("failed to set style {property}"))?;
        }
    }
    if let Some(text) = spec.text.as_deref() {
        element.set_text_content(Some(text));
    }
    for child in &spec.children {
        let child = materialize(document, child)?;
        element
            .append_child(&child)
            .map_err(|_| format!("failed to append child of <{}>", spec.tag))?;
    }
    Ok(element)
}
