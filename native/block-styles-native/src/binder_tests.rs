#[cfg(test)]
mod tests {
    use crate::binder::{
        carry_over_on_transform, merge_class_names, BindOutcome, BlockType, BlockTypeRegistry,
        StyleBinder, SAVE_STYLES_ATTR,
    };
    use crate::block::{Block, StyleAttributes, ATTR_STYLES};
    use crate::identity::{class_name_for, ShortHash, IdGenerator};
    use crate::tree::StyleTree;
    use crate::vars::MediaSizes;
    use serde_json::{json, Map, Value};

    fn tree(value: Value) -> StyleTree {
        match value {
            Value::Object(map) => map,
            _ => StyleTree::new(),
        }
    }

    /// Counter box: number color, hover color and a numeric font size.
    fn counter_box() -> BlockType {
        BlockType::new("ghostkit/counter-box").with_styles(|attrs: &Map<String, Value>| {
            let mut styles = StyleTree::new();
            if let Some(color) = attrs.get("numberColor") {
                styles.insert("--number-color".to_string(), color.clone());
            }
            if let Some(size) = attrs.get("numberSize") {
                styles.insert("fontSize".to_string(), size.clone());
            }
            if let Some(hover) = attrs.get("hoverNumberColor") {
                styles.insert("&:hover".to_string(), json!({ "--number-color": hover }));
            }
            styles
        })
    }

    /// Grid column: scoped under the grid, with an editor-only selector rewrite.
    fn grid_column() -> BlockType {
        BlockType::new("ghostkit/grid-column")
            .with_selector(|selector: &str| format!(".ghostkit-grid {}", selector))
            .with_styles(|attrs: &Map<String, Value>| {
                let mut styles = StyleTree::new();
                if attrs.get("sticky").and_then(Value::as_bool).unwrap_or(false) {
                    styles.insert("> .col-content".to_string(), json!({ "position": "sticky", "top": 10 }));
                }
                styles
            })
            .with_filter(|css: &str, _tree: &StyleTree, is_editor: bool, _attrs: &Map<String, Value>| {
                if is_editor {
                    css.replace("> .col-content", "> .block-edit > .col-content")
                } else {
                    css.to_string()
                }
            })
    }

    /// Bind and apply until nothing changes, returning the number of writes.
    fn settle(binder: &StyleBinder, block: &mut Block, block_type: &BlockType, mount: bool) -> usize {
        let mut writes = 0;
        loop {
            let document = vec![block.clone()];
            let outcome = binder.bind(block, &document, block_type, mount && writes == 0);
            if !outcome.apply(&mut block.attributes) {
                return writes;
            }
            writes += 1;
            assert!(writes < 5, "binder does not converge");
        }
    }

    #[test]
    fn test_mount_attaches_identity_and_styles() {
        let binder = StyleBinder::default();
        let block = Block::new("client-1", "ghostkit/counter-box")
            .with_attribute("numberColor", json!("#0366d6"));
        let document = vec![block.clone()];

        let outcome = binder.bind(&block, &document, &counter_box(), true);
        let id = ShortHash::default().generate("client-1", 0);
        let class_name = class_name_for("ghostkit/counter-box", &id);

        let mut expected_styles = StyleTree::new();
        expected_styles.insert(format!(".{}", class_name), json!({ "--number-color": "#0366d6" }));
        assert_eq!(
            outcome,
            BindOutcome::Update(StyleAttributes {
                id,
                class_name,
                styles: expected_styles,
            })
        );
    }

    #[test]
    fn test_binder_is_idempotent() {
        let binder = StyleBinder::default();
        let mut block = Block::new("client-1", "ghostkit/counter-box")
            .with_attribute("numberColor", json!("red"))
            .with_attribute("hoverNumberColor", json!("blue"));

        assert_eq!(settle(&binder, &mut block, &counter_box(), true), 1);

        let document = vec![block.clone()];
        assert_eq!(binder.bind(&block, &document, &counter_box(), false), BindOutcome::Unchanged);
        assert_eq!(binder.bind(&block, &document, &counter_box(), true), BindOutcome::Unchanged);
    }

    #[test]
    fn test_attribute_change_updates_styles_only() {
        let binder = StyleBinder::default();
        let mut block = Block::new("client-1", "ghostkit/counter-box")
            .with_attribute("numberColor", json!("red"));
        settle(&binder, &mut block, &counter_box(), true);
        let before = block.style_attributes();

        block.attributes.insert("numberSize".to_string(), json!(30));
        let document = vec![block.clone()];
        match binder.bind(&block, &document, &counter_box(), false) {
            BindOutcome::Update(next) => {
                assert_eq!(next.id, before.id);
                assert_eq!(next.class_name, before.class_name);
                let scope = next.styles.values().next().unwrap();
                assert_eq!(scope["fontSize"], json!(30));
            }
            other => panic!("expected update, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_tree_clears_styles() {
        let binder = StyleBinder::default();
        let mut block = Block::new("client-1", "ghostkit/counter-box")
            .with_attribute("numberColor", json!("red"));
        settle(&binder, &mut block, &counter_box(), true);
        assert!(block.style_attributes().has_style_state());

        block.attributes.remove("numberColor");
        let document = vec![block.clone()];
        let outcome = binder.bind(&block, &document, &counter_box(), false);
        assert_eq!(outcome, BindOutcome::Clear);
        assert!(outcome.apply(&mut block.attributes));

        let attrs = block.style_attributes();
        assert!(attrs.id.is_empty());
        assert!(attrs.class_name.is_empty());
        assert!(attrs.styles.is_empty());

        let document = vec![block.clone()];
        assert_eq!(binder.bind(&block, &document, &counter_box(), false), BindOutcome::Unchanged);
    }

    #[test]
    fn test_legacy_empty_string_styles_read_as_empty() {
        let block = Block::new("client-1", "ghostkit/counter-box").with_attribute(ATTR_STYLES, json!(""));
        assert!(!block.style_attributes().has_style_state());
        let binder = StyleBinder::default();
        assert_eq!(binder.bind(&block, &[block.clone()], &counter_box(), false), BindOutcome::Unchanged);
    }

    #[test]
    fn test_missing_callback_attaches_nothing() {
        let binder = StyleBinder::default();
        let block = Block::new("client-1", "core/paragraph");
        let plain = BlockType::new("core/paragraph");
        assert_eq!(binder.bind(&block, &[block.clone()], &plain, true), BindOutcome::Unchanged);
    }

    #[test]
    fn test_duplicated_block_gets_new_identity_on_mount() {
        let binder = StyleBinder::default();
        let mut original = Block::new("client-1", "ghostkit/counter-box")
            .with_attribute("numberColor", json!("red"));
        settle(&binder, &mut original, &counter_box(), true);

        let mut copy = original.clone();
        copy.client_id = "client-2".to_string();
        let document = vec![original.clone(), copy.clone()];

        match binder.bind(&copy, &document, &counter_box(), true) {
            BindOutcome::Update(next) => {
                assert_ne!(next.id, original.style_attributes().id);
                assert!(next.styles.contains_key(&format!(".{}", next.class_name)));
            }
            other => panic!("expected update, got {:?}", other),
        }
    }

    #[test]
    fn test_custom_selector_and_live_filter() {
        let binder = StyleBinder::default();
        let column = grid_column();
        let mut block = Block::new("col-1", "ghostkit/grid-column").with_attribute("sticky", json!(true));
        settle(&binder, &mut block, &column, true);

        let class_name = block.style_attributes().class_name;
        let exported = binder.export_styles(&block, &column).unwrap();
        assert_eq!(
            exported,
            format!(".ghostkit-grid .{} &gt; .col-content {{ position: sticky; top: 10px; }}", class_name)
        );

        let live = binder.live_styles(&block, &column, &MediaSizes::default()).unwrap();
        assert_eq!(
            live,
            format!(
                ".ghostkit-grid .{} > .block-edit > .col-content {{ position: sticky; top: 10px; }}",
                class_name
            )
        );
    }

    #[test]
    fn test_live_styles_resolve_breakpoints() {
        let binder = StyleBinder::default();
        let block_type = BlockType::new("ghostkit/box")
            .with_styles(|_: &Map<String, Value>| tree(json!({ "media_sm": { "width": 100 } })));
        let mut block = Block::new("box-1", "ghostkit/box");
        settle(&binder, &mut block, &block_type, true);

        let class_name = block.style_attributes().class_name;
        let live = binder.live_styles(&block, &block_type, &MediaSizes::default()).unwrap();
        assert_eq!(
            live,
            format!("@media (max-width: 576px) {{ .{} {{ width: 100px; }} }}", class_name)
        );
        let exported = binder.export_styles(&block, &block_type).unwrap();
        assert!(exported.starts_with("@media #{ghostkitvar:media_sm}"));
    }

    #[test]
    fn test_save_props_merge_class_and_styles() {
        let binder = StyleBinder::default();
        let mut block = Block::new("client-1", "ghostkit/counter-box")
            .with_attribute("numberColor", json!("red"));
        settle(&binder, &mut block, &counter_box(), true);
        let class_name = block.style_attributes().class_name;

        let mut props = Map::new();
        props.insert("className".to_string(), json!(format!("wp-block {}", class_name)));
        let props = binder.save_props(props, &block, &counter_box());

        assert_eq!(props["className"], json!(format!("wp-block {}", class_name)));
        assert_eq!(
            props[SAVE_STYLES_ATTR],
            json!(format!(".{} {{ --number-color: red; }}", class_name))
        );
    }

    #[test]
    fn test_save_props_untouched_without_styles() {
        let binder = StyleBinder::default();
        let block = Block::new("client-1", "ghostkit/counter-box");
        let props = binder.save_props(Map::new(), &block, &counter_box());
        assert!(props.is_empty());
    }

    #[test]
    fn test_merge_class_names_dedupes() {
        assert_eq!(merge_class_names(Some("a b  a"), "b c"), "a b c");
        assert_eq!(merge_class_names(None, "x"), "x");
    }

    #[test]
    fn test_registry_binding() {
        let mut registry = BlockTypeRegistry::new();
        registry.register(counter_box());
        let binder = StyleBinder::default();

        let known = Block::new("c1", "ghostkit/counter-box").with_attribute("numberColor", json!("red"));
        assert!(matches!(
            binder.bind_registered(&known, &[known.clone()], &registry, true),
            BindOutcome::Update(_)
        ));

        let unknown = Block::new("c2", "vendor/unknown").with_attribute("id", json!("abc"));
        assert_eq!(
            binder.bind_registered(&unknown, &[unknown.clone()], &registry, true),
            BindOutcome::Unchanged
        );
    }

    #[test]
    fn test_transform_carries_styles() {
        let binder = StyleBinder::default();
        let mut source = Block::new("client-1", "ghostkit/counter-box")
            .with_attribute("numberColor", json!("red"));
        settle(&binder, &mut source, &counter_box(), true);

        let mut transformed = Block::new("client-1", "ghostkit/icon-box");
        assert!(carry_over_on_transform(&mut transformed, &[source.clone()]));
        assert_eq!(transformed.style_attributes(), source.style_attributes());

        let mut other = Block::new("client-9", "ghostkit/icon-box");
        assert!(!carry_over_on_transform(&mut other, &[source]));
        assert!(!other.style_attributes().has_style_state());
    }
}
