use super::*;

use web_sys::HtmlTemplateElement;

/// Places operator custom code into the live document.
///
/// The markup is parsed through a `<template>`, so scripts in it are inert
/// until they are re-created here. Every `<script>` is cloned into a fresh
/// element, which the browser then executes with full page privileges. See
/// [`TrustedExtension`] for the trust boundary.
#[derive(Debug, Default)]
pub(super) struct DomCodeInjector {
    injections: usize,
}

impl TrustedExtension for DomCodeInjector {
    fn inject(&mut self, code: &str) -> Result<(), InjectionError> {
        let document = document().map_err(InjectionError::ContextUnavailable)?;
        let head = document
            .head()
            .ok_or_else(|| InjectionError::ContextUnavailable("document head is unavailable".to_string()))?;
        let body = document
            .body()
            .ok_or_else(|| InjectionError::ContextUnavailable("document body is unavailable".to_string()))?;

        let template = document
            .create_element("template")
            .map_err(|_| InjectionError::Failed("failed to create template".to_string()))?
            .dyn_into::<HtmlTemplateElement>()
            .map_err(|_| InjectionError::Failed("template is not HtmlTemplateElement".to_string()))?;
        template.set_inner_html(code);

        let parsed = template.content().child_nodes();
        // Appending moves nodes out of the fragment, so snapshot them first.
        let nodes = (0..parsed.length())
            .filter_map(|index| parsed.item(index))
            .collect::<Vec<Node>>();

        self.injections += 1;
        let marker = self.injections.to_string();
        for node in nodes {
            let Some(element) = node.dyn_ref::<Element>() else {
                body.append_child(&node)
                    .map_err(|_| InjectionError::Failed("failed to append text node".to_string()))?;
                continue;
            };
            let tag = element.tag_name().to_ascii_lowercase();
            let placed: Element = if tag == "script" {
                activate_script(&document, element)?
            } else {
                element.clone()
            };
            placed
                .set_attribute(INJECTED_MARKER_ATTRIBUTE, &marker)
                .map_err(|_| InjectionError::Failed(format!("failed to mark <{tag}>")))?;
            let parent: &Node = if matches!(tag.as_str(), "script" | "style" | "link" | "meta") {
                &head
            } else {
                &body
            };
            parent
                .append_child(&placed)
                .map_err(|_| InjectionError::Failed(format!("failed to append <{tag}>")))?;
        }
        tracing::info!(injection = self.injections, bytes = code.len(), "custom code injected");
        Ok(())
    }
}

fn activate_script(document: &web_sys::Document, source: &Element) -> Result<Element, InjectionError> {
    let script = document
        .create_element("script")
        .map_err(|_| InjectionError::Failed("failed to create script".to_string()))?;
    let attributes = source.attributes();
    for index in 0..attributes.length() {
        let Some(attribute) = attributes.item(index) else {
            continue;
        };
        script
            .set_attribute(&attribute.name(), &attribute.value())
            .map_err(|_| InjectionError::Failed(format!("invalid script attribute {}", attribute.name())))?;
    }
    script.set_text_content(source.text_content().as_deref());
    Ok(script)
}
