use nezha_dash_core::{
    BackgroundLayer, BackgroundPlan, ErrorViewParams, LayerVisibility, MOBILE_BREAKPOINT_PX,
    MountedShell, RouteMatch, ShellOutput, ShellRegion, ViewId,
};

pub(crate) const ROOT_ID: &str = "nezha-dash-root";
pub(crate) const STYLESHEET_ID: &str = "nezha-dash-responsive";
pub(crate) const HEADER_ID: &str = "nezha-dash-header";
pub(crate) const CONTENT_ID: &str = "nezha-dash-content";
pub(crate) const FOOTER_ID: &str = "nezha-dash-footer";
pub(crate) const LAYOUT_CLASS: &str = "nezha-dash-layout";
pub(crate) const MAIN_CLASS: &str = "nezha-dash-main";
pub(crate) const DEFAULT_BACKGROUND_CLASS: &str = "nezha-dash-default-background";
pub(crate) const DEFAULT_BACKGROUND_NARROW_CLASS: &str = "nezha-dash-default-background-narrow";
pub(crate) const DEFAULT_BACKGROUND_WIDE_CLASS: &str = "nezha-dash-default-background-wide";
pub(crate) const BACKGROUND_LAYER_CLASS: &str = "nezha-dash-background-layer";
pub(crate) const BELOW_BREAKPOINT_CLASS: &str = "nezha-dash-below-breakpoint";
pub(crate) const AT_BREAKPOINT_CLASS: &str = "nezha-dash-at-breakpoint";

/// Detached description of a DOM element; the browser build materializes it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ElementSpec {
    pub tag: &'static str,
    pub id: Option<&'static str>,
    pub classes: Vec<&'static str>,
    pub attributes: Vec<(&'static str, String)>,
    pub style: Vec<(&'static str, String)>,
    pub text: Option<String>,
    pub children: Vec<ElementSpec>,
}

impl ElementSpec {
    fn new(tag: &'static str) -> Self {
        Self {
            tag,
            ..Self::default()
        }
    }

    fn with_id(mut self, id: &'static str) -> Self {
        self.id = Some(id);
        self
    }

    fn with_class(mut self, class: &'static str) -> Self {
        self.classes.push(class);
        self
    }

    fn with_attribute(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attributes.push((name, value.into()));
        self
    }

    fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    fn with_child(mut self, child: ElementSpec) -> Self {
        self.children.push(child);
        self
    }
}

/// Media rules backing the visibility classes. The default background colour
/// is left to the host theme through `--nezha-dash-background`.
pub(crate) fn responsive_stylesheet() -> String {
    let background = "var(--nezha-dash-background,#fff)";
    format!(
        ".{BELOW_BREAKPOINT_CLASS}{{display:block}}\
         .{AT_BREAKPOINT_CLASS}{{display:none}}\
         .{DEFAULT_BACKGROUND_CLASS},.{DEFAULT_BACKGROUND_NARROW_CLASS}{{background:{background}}}\
         @media (min-width:{MOBILE_BREAKPOINT_PX}px){{\
         .{BELOW_BREAKPOINT_CLASS}{{display:none}}\
         .{AT_BREAKPOINT_CLASS}{{display:block}}\
         .{DEFAULT_BACKGROUND_NARROW_CLASS}{{background:transparent}}\
         .{DEFAULT_BACKGROUND_WIDE_CLASS}{{background:{background}}}\
         }}"
    )
}

fn visibility_class(visibility: LayerVisibility) -> Option<&'static str> {
    match visibility {
        LayerVisibility::Always => None,
        LayerVisibility::BelowBreakpoint => Some(BELOW_BREAKPOINT_CLASS),
        LayerVisibility::AtOrAboveBreakpoint => Some(AT_BREAKPOINT_CLASS),
    }
}

/// Element tree for the current output, or `None` when nothing is shown.
pub(crate) fn render_output(output: &ShellOutput) -> Option<ElementSpec> {
    match output {
        ShellOutput::Empty => None,
        ShellOutput::Error(error) => Some(
            ElementSpec::new("div").with_id(ROOT_ID).with_child(error_view(
                &ErrorViewParams {
                    code: Some(error.code),
                    message: Some(error.message.clone()),
                },
            )),
        ),
        ShellOutput::Mounted(mounted) => Some(mounted_shell(mounted)),
    }
}

fn mounted_shell(mounted: &MountedShell) -> ElementSpec {
    let mut root = ElementSpec::new("div").with_id(ROOT_ID);
    for layer in &mounted.background.layers {
        root = root.with_child(background_layer(layer));
    }

    let mut main = ElementSpec::new("main").with_class(MAIN_CLASS);
    for region in mounted.regions() {
        main = main.with_child(match region {
            ShellRegion::Header => header(mounted),
            ShellRegion::Content => content(&mounted.route),
            ShellRegion::Footer => footer(mounted),
        });
    }

    root.with_child(layout(&mounted.background).with_child(main))
}

fn layout(background: &BackgroundPlan) -> ElementSpec {
    let layout = ElementSpec::new("div").with_class(LAYOUT_CLASS);
    match background.default_background {
        Some(LayerVisibility::Always) => layout.with_class(DEFAULT_BACKGROUND_CLASS),
        Some(LayerVisibility::BelowBreakpoint) => layout.with_class(DEFAULT_BACKGROUND_NARROW_CLASS),
        Some(LayerVisibility::AtOrAboveBreakpoint) => {
            layout.with_class(DEFAULT_BACKGROUND_WIDE_CLASS)
        }
        None => layout,
    }
}

fn background_layer(layer: &BackgroundLayer) -> ElementSpec {
    let mut element = ElementSpec::new("div")
        .with_class(BACKGROUND_LAYER_CLASS)
        .with_attribute(
            "data-layer",
            match layer.kind {
                nezha_dash_core::LayerKind::Desktop => "desktop",
                nezha_dash_core::LayerKind::Mobile => "mobile",
            },
        )
        .with_attribute("aria-hidden", "true");
    if let Some(class) = visibility_class(layer.visibility) {
        element = element.with_class(class);
    }
    element.style = layer.style_declarations();
    element
}

fn header(mounted: &MountedShell) -> ElementSpec {
    let mut header = ElementSpec::new("header").with_id(HEADER_ID);
    if let Some(site_name) = mounted.settings.site_name.as_deref() {
        header = header
            .with_attribute("data-site-name", site_name)
            .with_text(site_name);
    }
    header
}

fn footer(mounted: &MountedShell) -> ElementSpec {
    let mut footer = ElementSpec::new("footer").with_id(FOOTER_ID);
    if let Some(version) = mounted.settings.version.as_deref() {
        footer = footer.with_attribute("data-version", version);
    }
    footer
}

fn content(route: &RouteMatch) -> ElementSpec {
    let section = ElementSpec::new("section")
        .with_id(CONTENT_ID)
        .with_attribute("data-route", route.pattern);
    match route.view {
        ViewId::ServerList => section.with_child(view_slot(ViewId::ServerList)),
        ViewId::ServerDetail => section.with_child(
            view_slot(ViewId::ServerDetail)
                .with_attribute("data-server-id", route.param("id").unwrap_or_default()),
        ),
        ViewId::Error => section.with_child(error_view(&route.error_params())),
        ViewId::NotFound => section.with_child(
            view_slot(ViewId::NotFound)
                .with_attribute("data-path", route.path.clone())
                .with_text("404"),
        ),
    }
}

fn view_slot(view: ViewId) -> ElementSpec {
    ElementSpec::new("div").with_attribute("data-view", view.as_str())
}

fn error_view(params: &ErrorViewParams) -> ElementSpec {
    let mut view = view_slot(ViewId::Error);
    if let Some(code) = params.code {
        view = view
            .with_attribute("data-code", code.to_string())
            .with_child(ElementSpec::new("h1").with_text(code.to_string()));
    }
    if let Some(message) = params.message.as_deref() {
        view = view.with_child(ElementSpec::new("p").with_text(message));
    }
    view
}
