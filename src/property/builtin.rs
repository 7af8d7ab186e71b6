//! The built-in report-design vocabulary.

use super::definition::{
    ElementDefinition, MetaDataDictionary, NameScope, PropertyDefinition, SlotDefinition,
};
use super::value::{Dimension, PropertyKind, Value};

/// Element type names.
pub mod types {
    pub const DESIGN_ELEMENT: &str = "DesignElement";
    pub const MODULE: &str = "Module";
    pub const REPORT_DESIGN: &str = "ReportDesign";
    pub const LIBRARY: &str = "Library";
    pub const STYLE: &str = "Style";
    pub const THEME: &str = "Theme";
    pub const REPORT_ITEM: &str = "ReportItem";
    pub const LABEL: &str = "Label";
    pub const TEXT: &str = "Text";
    pub const DATA: &str = "Data";
    pub const IMAGE: &str = "Image";
    pub const GRID: &str = "Grid";
    pub const TABLE: &str = "Table";
    pub const ROW: &str = "Row";
    pub const CELL: &str = "Cell";
    pub const MASTER_PAGE: &str = "MasterPage";
    pub const SIMPLE_MASTER_PAGE: &str = "SimpleMasterPage";
}

/// Slot names.
pub mod slots {
    pub const STYLES: &str = "styles";
    pub const THEMES: &str = "themes";
    pub const COMPONENTS: &str = "components";
    pub const BODY: &str = "body";
    pub const SCRATCH_PAD: &str = "scratchPad";
    pub const PAGE_SETUP: &str = "pageSetup";
    pub const ROWS: &str = "rows";
    pub const HEADER: &str = "header";
    pub const DETAIL: &str = "detail";
    pub const FOOTER: &str = "footer";
    pub const CELLS: &str = "cells";
    pub const CONTENT: &str = "content";
    pub const PAGE_HEADER: &str = "pageHeader";
    pub const PAGE_FOOTER: &str = "pageFooter";
}

/// Property names the engine itself reads.
pub mod props {
    pub const STYLE: &str = "style";
    pub const THEME: &str = "theme";
    pub const BOOKMARK: &str = "bookmark";
    pub const TOC: &str = "toc";
    pub const TEMPLATE_PARAMETER: &str = "templateParameter";
    pub const ENABLE_ACL: &str = "enableACL";
    pub const ACL_EXPRESSION: &str = "aclExpression";
    pub const CASCADE_ACL: &str = "cascadeACL";
    pub const TEXT: &str = "text";
}

/// Name spaces of the module-wide name index.
pub mod name_spaces {
    pub const ELEMENT: &str = "element";
    pub const STYLE: &str = "style";
    pub const THEME: &str = "theme";
    pub const MASTER_PAGE: &str = "masterPage";
}

fn string(name: &str) -> PropertyDefinition {
    PropertyDefinition::new(name, PropertyKind::String)
}

fn expression(name: &str) -> PropertyDefinition {
    PropertyDefinition::new(name, PropertyKind::Expression)
}

fn dimension(name: &str) -> PropertyDefinition {
    PropertyDefinition::new(name, PropertyKind::Dimension)
}

fn border_style(name: &str) -> PropertyDefinition {
    PropertyDefinition::new(
        name,
        PropertyKind::choice(&["none", "solid", "dotted", "dashed", "double"]),
    )
    .with_default(Value::Choice("none".into()))
    .style()
}

fn padding(name: &str) -> PropertyDefinition {
    dimension(name)
        .with_default(Dimension::new(1.0, "pt"))
        .style()
}

/// Style properties shared by `Style` elements and report items.
fn style_properties() -> Vec<PropertyDefinition> {
    vec![
        PropertyDefinition::new("color", PropertyKind::Color)
            .with_default(Value::Color("black".into()))
            .style(),
        PropertyDefinition::new("backgroundColor", PropertyKind::Color).style(),
        string("fontFamily")
            .with_default("serif")
            .style(),
        dimension("fontSize")
            .with_default(Dimension::new(10.0, "pt"))
            .style(),
        PropertyDefinition::new("fontWeight", PropertyKind::choice(&["normal", "bold"]))
            .with_default(Value::Choice("normal".into()))
            .style(),
        PropertyDefinition::new("fontStyle", PropertyKind::choice(&["normal", "italic"]))
            .with_default(Value::Choice("normal".into()))
            .style(),
        PropertyDefinition::new(
            "textAlign",
            PropertyKind::choice(&["left", "center", "right", "justify"]),
        )
        .with_default(Value::Choice("left".into()))
        .style(),
        PropertyDefinition::new(
            "verticalAlign",
            PropertyKind::choice(&["top", "middle", "bottom", "baseline"]),
        )
        .with_default(Value::Choice("baseline".into()))
        .style(),
        border_style("borderTopStyle"),
        border_style("borderBottomStyle"),
        border_style("borderLeftStyle"),
        border_style("borderRightStyle"),
        padding("paddingTop"),
        padding("paddingBottom"),
        padding("paddingLeft"),
        padding("paddingRight"),
        PropertyDefinition::new("display", PropertyKind::choice(&["block", "inline", "none"]))
            .with_default(Value::Choice("block".into()))
            .style(),
    ]
}

fn acl_properties() -> Vec<PropertyDefinition> {
    vec![
        PropertyDefinition::new(props::ENABLE_ACL, PropertyKind::Boolean).with_default(false),
        expression(props::ACL_EXPRESSION),
        PropertyDefinition::new(props::CASCADE_ACL, PropertyKind::Boolean).with_default(true),
    ]
}

fn with_all(mut def: ElementDefinition, properties: Vec<PropertyDefinition>) -> ElementDefinition {
    def.properties.extend(properties);
    def
}

impl MetaDataDictionary {
    /// Dictionary with the built-in report-design element types.
    pub fn builtin() -> Self {
        use types::*;

        let mut dict = MetaDataDictionary::new();

        dict.register(
            ElementDefinition::new(DESIGN_ELEMENT)
                .abstract_type()
                .property(string("comments")),
        );

        dict.register(with_all(
            ElementDefinition::new(MODULE)
                .extends(DESIGN_ELEMENT)
                .abstract_type()
                .css_host()
                .property(string("title"))
                .property(string("author"))
                .property(string("displayName"))
                .property(string("displayNameKey"))
                .property(string("iconFile"))
                .property(string("cheatSheet"))
                .property(PropertyDefinition::new("thumbnail", PropertyKind::Bytes))
                .property(string(props::THEME))
                .property(
                    PropertyDefinition::new("createdBy", PropertyKind::String).locked(),
                ),
            acl_properties(),
        ));

        dict.register(
            ElementDefinition::new(REPORT_DESIGN)
                .extends(MODULE)
                .property(expression("beforeFactory"))
                .property(expression("afterFactory"))
                .property(expression("beforeRender"))
                .property(expression("afterRender"))
                .property(string("base"))
                .property(PropertyDefinition::new("refreshRate", PropertyKind::Integer))
                .property(
                    PropertyDefinition::new(
                        "layoutPreference",
                        PropertyKind::choice(&["fixed layout", "auto layout"]),
                    )
                    .with_default(Value::Choice("auto layout".into())),
                )
                .property(
                    PropertyDefinition::new("bidiOrientation", PropertyKind::choice(&["ltr", "rtl"]))
                        .with_default(Value::Choice("ltr".into())),
                )
                .property(PropertyDefinition::new("imageDPI", PropertyKind::Integer))
                .slot(SlotDefinition::new(slots::STYLES, &[STYLE]))
                .slot(SlotDefinition::new(slots::COMPONENTS, &[REPORT_ITEM]))
                .slot(SlotDefinition::new(slots::BODY, &[REPORT_ITEM]))
                .slot(SlotDefinition::new(slots::SCRATCH_PAD, &[REPORT_ITEM]))
                .slot(SlotDefinition::new(slots::PAGE_SETUP, &[MASTER_PAGE])),
        );

        dict.register(
            ElementDefinition::new(LIBRARY)
                .extends(MODULE)
                .slot(SlotDefinition::new(slots::THEMES, &[THEME]))
                .slot(SlotDefinition::new(slots::COMPONENTS, &[REPORT_ITEM]))
                .slot(SlotDefinition::new(slots::PAGE_SETUP, &[MASTER_PAGE])),
        );

        dict.register(with_all(
            ElementDefinition::new(STYLE)
                .extends(DESIGN_ELEMENT)
                .name_required()
                .with_name_space(name_spaces::STYLE),
            style_properties(),
        ));

        dict.register(
            ElementDefinition::new(THEME)
                .extends(DESIGN_ELEMENT)
                .name_required()
                .with_name_space(name_spaces::THEME)
                .css_host()
                .slot(SlotDefinition::new(slots::STYLES, &[STYLE]).with_scope(NameScope::Slot)),
        );

        let mut report_item = ElementDefinition::new(REPORT_ITEM)
            .extends(DESIGN_ELEMENT)
            .abstract_type()
            .with_name_space(name_spaces::ELEMENT)
            .property(string(props::STYLE))
            .property(expression(props::BOOKMARK))
            .property(expression(props::TOC))
            .property(string(props::TEMPLATE_PARAMETER))
            .property(dimension("width"))
            .property(dimension("height"));
        report_item.properties.extend(acl_properties());
        dict.register(with_all(report_item, style_properties()));

        dict.register(
            ElementDefinition::new(LABEL)
                .extends(REPORT_ITEM)
                .property(string(props::TEXT))
                .property(string("textID")),
        );
        dict.register(
            ElementDefinition::new(TEXT)
                .extends(REPORT_ITEM)
                .property(string("content"))
                .property(
                    PropertyDefinition::new(
                        "contentType",
                        PropertyKind::choice(&["auto", "plain", "html"]),
                    )
                    .with_default(Value::Choice("auto".into())),
                ),
        );
        dict.register(
            ElementDefinition::new(DATA)
                .extends(REPORT_ITEM)
                .property(string("resultSetColumn"))
                .property(expression("valueExpr")),
        );
        dict.register(
            ElementDefinition::new(IMAGE)
                .extends(REPORT_ITEM)
                .property(
                    PropertyDefinition::new(
                        "source",
                        PropertyKind::choice(&["url", "file", "embed", "expr"]),
                    )
                    .with_default(Value::Choice("url".into())),
                )
                .property(expression("uri"))
                .property(string("imageName")),
        );
        dict.register(
            ElementDefinition::new(GRID)
                .extends(REPORT_ITEM)
                .slot(SlotDefinition::new(slots::ROWS, &[ROW]).with_scope(NameScope::None)),
        );
        dict.register(
            ElementDefinition::new(TABLE)
                .extends(REPORT_ITEM)
                .property(string("dataSet"))
                .property(PropertyDefinition::new("columnBindings", PropertyKind::StructList))
                .slot(SlotDefinition::new(slots::HEADER, &[ROW]).with_scope(NameScope::None))
                .slot(SlotDefinition::new(slots::DETAIL, &[ROW]).with_scope(NameScope::None))
                .slot(SlotDefinition::new(slots::FOOTER, &[ROW]).with_scope(NameScope::None)),
        );
        dict.register(
            ElementDefinition::new(ROW)
                .extends(DESIGN_ELEMENT)
                .property(dimension("height"))
                .property(string(props::STYLE))
                .slot(SlotDefinition::new(slots::CELLS, &[CELL]).with_scope(NameScope::None)),
        );
        dict.register(
            ElementDefinition::new(CELL)
                .extends(DESIGN_ELEMENT)
                .property(PropertyDefinition::new("colSpan", PropertyKind::Integer).with_default(1i64))
                .property(PropertyDefinition::new("rowSpan", PropertyKind::Integer).with_default(1i64))
                .slot(SlotDefinition::new(slots::CONTENT, &[REPORT_ITEM])),
        );
        dict.register(
            ElementDefinition::new(MASTER_PAGE)
                .extends(DESIGN_ELEMENT)
                .abstract_type()
                .name_required()
                .with_name_space(name_spaces::MASTER_PAGE)
                .property(
                    PropertyDefinition::new(
                        "orientation",
                        PropertyKind::choice(&["auto", "portrait", "landscape"]),
                    )
                    .with_default(Value::Choice("auto".into())),
                ),
        );
        dict.register(
            ElementDefinition::new(SIMPLE_MASTER_PAGE)
                .extends(MASTER_PAGE)
                .slot(SlotDefinition::new(slots::PAGE_HEADER, &[REPORT_ITEM]))
                .slot(SlotDefinition::new(slots::PAGE_FOOTER, &[REPORT_ITEM])),
        );

        dict
    }
}
