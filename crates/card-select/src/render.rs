use manos_block_core::{ElementNode, I18n, Node, Styles, make};
use serde_json::json;

use crate::blocking::{Affordance, BlockingState};
use crate::config::CardSelectConfig;
use crate::coordinator::{FileSlot, ItemSnapshot};
use crate::files::{file_icon, format_file_size};
use crate::icons::{ICON_CLEAR, ICON_FILE, ICON_LINK, ICON_TRASH};
use crate::model::{FileRef, LinkState, LinkVariant};

pub mod css {
    pub const WRAPPER: &str = "card-with-select";
    pub const ITEMS: &str = "card-with-select__items";
    pub const COUNTER: &str = "card-with-select__counter";
    pub const ITEM: &str = "card-with-select__item";
    pub const ITEM_HEADER: &str = "card-with-select__item-header";
    pub const TYPE_BADGE: &str = "card-with-select__type-badge";
    pub const REMOVE: &str = "card-with-select__remove";
    pub const TITLE: &str = "card-with-select__title";
    pub const DESCRIPTION: &str = "card-with-select__description";
    pub const SELECT_WRAPPER: &str = "card-with-select__select-wrapper";
    pub const SELECT_CLEAR: &str = "card-with-select__select-clear";
    pub const CUSTOM_LINK: &str = "card-with-select__custom-link";
    pub const FILE_ZONE: &str = "card-with-select__file-zone";
    pub const FILE_ZONE_DRAGOVER: &str = "card-with-select__file-zone--dragover";
    pub const FILE_PROGRESS: &str = "card-with-select__file-progress";
    pub const FILE_INFO: &str = "card-with-select__file-info";
    pub const FILE_ICON: &str = "card-with-select__file-icon";
    pub const FILE_NAME: &str = "card-with-select__file-name";
    pub const FILE_SIZE: &str = "card-with-select__file-size";
    pub const FILE_DOWNLOAD: &str = "card-with-select__file-download";
    pub const FILE_WARNING: &str = "card-with-select__file-warning";
    pub const FILE_REPLACE: &str = "card-with-select__file-replace";
    pub const DISABLED: &str = "card-with-select--disabled";
    pub const READ_ONLY: &str = "card-with-select--read-only";
}

pub struct RenderContext<'a> {
    pub styles: &'a Styles,
    pub i18n: &'a dyn I18n,
    pub config: &'a CardSelectConfig,
    pub read_only: bool,
}

impl RenderContext<'_> {
    fn t(&self, key: &str) -> String {
        self.i18n.t(key)
    }
}

pub fn render_block(items: Vec<Node>, ctx: &RenderContext<'_>) -> Node {
    let count = items.len();
    make("div", &[css::WRAPPER, ctx.styles.block.as_str()], [("data-count", json!(count))])
        .class_if(ctx.read_only, css::READ_ONLY)
        .child(ElementNode::new("div").class(css::ITEMS).children(items))
        .child(
            ElementNode::new("span")
                .class(css::COUNTER)
                .text(format!("{count} / {}", ctx.config.max_items())),
        )
        .build()
}

pub fn render_item(item: &ItemSnapshot, select: Option<Node>, ctx: &RenderContext<'_>) -> Node {
    let read_only = ctx.read_only || item.read_only;
    let type_config = match &item.variant {
        LinkVariant::Reference(key) => ctx.config.link_type(key),
        _ => None,
    };

    let (badge_icon, badge_label) = match (&item.variant, type_config) {
        (LinkVariant::Reference(_), Some(ty)) => (ty.icon.clone(), ty.button_label.clone()),
        (LinkVariant::Reference(key), None) => ("📄".to_string(), key.clone()),
        (LinkVariant::CustomUrl, _) => (ICON_LINK.to_string(), ctx.t("Custom link")),
        (LinkVariant::File, _) => (ICON_FILE.to_string(), ctx.t("File")),
    };

    let mut header = ElementNode::new("div").class(css::ITEM_HEADER).child(
        make("span", &[css::TYPE_BADGE], [("data-icon", json!(badge_icon))]).text(badge_label),
    );
    if !read_only {
        header = header.child(
            make(
                "button",
                &[css::REMOVE, ctx.styles.button.as_str()],
                [
                    ("type", json!("button")),
                    ("title", json!(ctx.t("Remove"))),
                    ("html", json!(ICON_TRASH)),
                ],
            ),
        );
    }

    let mut element = make(
        "div",
        &[css::ITEM],
        [
            ("data-item-id", json!(item.id.0)),
            ("data-link-type", json!(item.variant.key())),
        ],
    )
    .class_if(read_only, css::READ_ONLY)
    .child(header)
    .child(editable(css::TITLE, &item.title, &ctx.config.title_placeholder, read_only, ctx))
    .child(editable(
        css::DESCRIPTION,
        &item.description,
        &ctx.config.description_placeholder,
        read_only,
        ctx,
    ));
    if let Some(ty) = type_config.filter(|ty| !ty.color.is_empty()) {
        element = element.style("border-left-color", ty.color.clone());
    }

    let node = match item.variant.affordance() {
        Affordance::Reference => render_reference(item, select, read_only, ctx),
        Affordance::CustomUrl => render_custom_link(item, read_only, ctx),
        Affordance::File => render_file(item, read_only, ctx),
    };
    element.child(node).build()
}

fn editable(
    class: &str,
    html: &str,
    placeholder: &str,
    read_only: bool,
    ctx: &RenderContext<'_>,
) -> Node {
    make(
        "div",
        &[class, ctx.styles.input.as_str()],
        [
            ("contenteditable", json!(!read_only)),
            ("data-placeholder", json!(ctx.t(placeholder))),
            ("html", json!(html)),
        ],
    )
    .build()
}

fn blocked(
    element: ElementNode,
    blocking: &BlockingState,
    affordance: Affordance,
    read_only: bool,
    ctx: &RenderContext<'_>,
) -> ElementNode {
    if read_only {
        return element.attr("disabled", true);
    }
    match blocking.disabled_hint(affordance) {
        Some(hint) => element
            .class(css::DISABLED)
            .style("opacity", "0.5")
            .style("pointer-events", "none")
            .style("cursor", "not-allowed")
            .attr("disabled", true)
            .attr("title", ctx.t(hint)),
        None => element.attr("disabled", false).attr("title", ""),
    }
}

fn render_reference(
    item: &ItemSnapshot,
    select: Option<Node>,
    read_only: bool,
    ctx: &RenderContext<'_>,
) -> Node {
    let selected = matches!(item.link, LinkState::Reference { .. });
    let mut wrapper = ElementNode::new("div").class(css::SELECT_WRAPPER);
    if let LinkState::Reference { id, .. } = &item.link {
        wrapper = wrapper.attr("data-entity-id", id.clone());
    }
    if let Some(select) = select {
        wrapper = wrapper.child(select);
    }
    wrapper = wrapper.child(make(
        "button",
        &[css::SELECT_CLEAR],
        [
            ("type", json!("button")),
            ("title", json!(ctx.t("Clear"))),
            ("hidden", json!(!selected || read_only)),
            ("html", json!(ICON_CLEAR)),
        ],
    ));
    blocked(wrapper, &item.blocking, Affordance::Reference, read_only, ctx).build()
}

fn render_custom_link(item: &ItemSnapshot, read_only: bool, ctx: &RenderContext<'_>) -> Node {
    let input = make(
        "input",
        &[css::CUSTOM_LINK, ctx.styles.input.as_str()],
        [
            ("type", json!("url")),
            ("placeholder", json!(ctx.t("Custom link (https://...)"))),
            ("value", json!(item.custom_url)),
        ],
    );
    blocked(input, &item.blocking, Affordance::CustomUrl, read_only, ctx).build()
}

fn render_file(item: &ItemSnapshot, read_only: bool, ctx: &RenderContext<'_>) -> Node {
    let mut wrapper = ElementNode::new("div");
    let has_file = !matches!(item.file, FileSlot::Empty);

    if !read_only {
        let zone = make(
            "div",
            &[css::FILE_ZONE],
            [
                ("hidden", json!(has_file)),
                ("data-label", json!(ctx.t("Click or drop a file here"))),
            ],
        )
        .class_if(item.drag_over, css::FILE_ZONE_DRAGOVER)
        .child(make("input", &[], [("type", json!("file")), ("hidden", json!(true))]));
        wrapper = wrapper.child(blocked(zone, &item.blocking, Affordance::File, read_only, ctx));
    }

    match &item.file {
        FileSlot::Empty => {}
        FileSlot::Uploading { name, size } => {
            wrapper = wrapper.child(
                make("div", &[css::FILE_PROGRESS, ctx.styles.loader.as_str()], [("data-name", json!(name))])
                    .text(format!("{} {name} ({})", ctx.t("Uploading"), format_file_size(*size))),
            );
        }
        FileSlot::Attached(file) => {
            wrapper = wrapper.child(render_file_info(file, &item.file_name_draft, read_only, ctx));
        }
    }
    wrapper.build()
}

fn render_file_info(file: &FileRef, draft: &str, read_only: bool, ctx: &RenderContext<'_>) -> Node {
    let extension = file.extension_or_derived().unwrap_or_default();
    let mut info = make(
        "div",
        &[css::FILE_INFO],
        [("data-local-only", json!(file.is_local_only))],
    )
    .child(ElementNode::new("span").class(css::FILE_ICON).text(file_icon(&extension)))
    .child(make(
        "input",
        &[css::FILE_NAME, ctx.styles.input.as_str()],
        [
            ("type", json!("text")),
            ("value", json!(draft)),
            ("data-extension", json!(extension)),
            ("disabled", json!(read_only)),
        ],
    ));
    if let Some(size) = file.size {
        info = info.child(ElementNode::new("span").class(css::FILE_SIZE).text(format_file_size(size)));
    }

    info = if file.is_local_only {
        info.child(
            ElementNode::new("span")
                .class(css::FILE_WARNING)
                .text(ctx.t("File was not uploaded, download unavailable")),
        )
    } else {
        info.child(
            make(
                "a",
                &[css::FILE_DOWNLOAD],
                [
                    ("href", json!(file.url)),
                    ("download", json!(file.name)),
                    ("target", json!("_blank")),
                ],
            )
            .text(ctx.t("Download")),
        )
    };

    if !read_only {
        info = info.child(
            make("button", &[css::FILE_REPLACE, ctx.styles.button.as_str()], [("type", json!("button"))])
                .text(ctx.t("Replace")),
        );
    }
    info.build()
}
