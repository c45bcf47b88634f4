#[cfg(test)]
mod rendering_tests {
    use crate::renderer::wrap::{strip_ansi, visual_length};
    use crate::{render_json, DocumentParser, DocumentRenderer, Node, Theme, ThemeConfig};

    fn el(tag: &str) -> Node {
        Node::element(tag)
    }

    fn text(value: &str) -> Node {
        Node::text(value)
    }

    fn render_at(root: Node, width: usize) -> String {
        let document = DocumentParser::from_node(root);
        DocumentRenderer::new(Theme::plain())
            .with_width(width)
            .render(&document)
    }

    fn render(root: Node) -> String {
        render_at(root, 80)
    }

    fn doc(children: Vec<Node>) -> Node {
        Node::new(crate::NodeKind::Document).with_children(children)
    }

    #[test]
    fn test_heading_and_paragraph_have_one_blank_line() {
        let output = render(doc(vec![
            el("h1").with_child(text("Hi")),
            el("p").with_child(text("Text")),
        ]));
        assert_eq!(output, "\nHi\n\nText\n\n");
    }

    #[test]
    fn test_adjacent_paragraph_margins_collapse() {
        let output = render(doc(vec![
            el("p").with_child(text("one")),
            el("div").with_child(el("p").with_child(text("two"))),
            el("p").with_child(text("three")),
        ]));
        assert_eq!(output, "\none\n\ntwo\n\nthree\n\n");
    }

    #[test]
    fn test_inline_whitespace_collapses_between_siblings() {
        let output = render(el("p").with_children(vec![
            text("Hello  "),
            el("strong").with_child(text("big")),
            text("\n  world"),
            el("em").with_child(text("!")),
        ]));
        assert_eq!(output, "\nHello big world!\n\n");
    }

    #[test]
    fn test_whitespace_between_blocks_is_dropped() {
        let output = render(el("div").with_children(vec![
            text("\n  "),
            el("p").with_child(text("a")),
            text("\n  "),
            el("p").with_child(text("b")),
            text("\n"),
        ]));
        assert_eq!(output, "\na\n\nb\n\n");
    }

    #[test]
    fn test_line_break_does_not_indent_next_line() {
        let output = render(el("p").with_children(vec![text("a"), el("br"), text(" b")]));
        assert_eq!(output, "\na\nb\n\n");
    }

    #[test]
    fn test_paragraph_wraps_to_width() {
        let output = render_at(
            el("p").with_child(text("the quick brown fox jumps over the lazy dog")),
            15,
        );
        assert_eq!(output, "\nthe quick brown\nfox jumps over\nthe lazy dog\n\n");
    }

    #[test]
    fn test_alignment_attribute() {
        let output = render_at(el("p").with_attr("align", "right").with_child(text("end")), 10);
        assert_eq!(output, "\n       end\n\n");
    }

    #[test]
    fn test_depth_ceiling_drops_only_deep_subtree() {
        fn nest(levels: usize, leaf: &str) -> Node {
            (0..levels).fold(text(leaf), |inner, _| el("div").with_child(inner))
        }

        // The document is level 1, so 98 wrappers put the text at level 100.
        let output = render(doc(vec![
            el("p").with_child(text("before")),
            nest(98, "visible"),
            nest(99, "hidden"),
            nest(150, "deeper"),
            el("p").with_child(text("after")),
        ]));

        assert!(output.contains("before"));
        assert!(output.contains("visible"));
        assert!(!output.contains("hidden"));
        assert!(!output.contains("deeper"));
        assert!(output.contains("after"));
    }

    #[test]
    fn test_depth_ceiling_applies_to_json_input() {
        let nest = |levels: usize, leaf: &str| {
            format!(
                "{}\"{}\"{}",
                r#"{"tag": "div", "children": ["#.repeat(levels),
                leaf,
                "]}".repeat(levels)
            )
        };
        let json = format!(
            r#"[{{"tag": "p", "children": ["before"]}}, {}, {}, {{"tag": "p", "children": ["after"]}}]"#,
            nest(98, "visible"),
            nest(120, "hidden"),
        );

        let output = render_json(&json, Theme::plain(), 80).unwrap();
        assert_eq!(output, "\nbefore\n\nvisible\n\nafter\n\n");
    }

    #[test]
    fn test_failed_subtree_is_skipped() {
        let output = render(doc(vec![
            el("p").with_child(text("before")),
            el("table").with_child(el("caption").with_child(text("no rows"))),
            el("p").with_child(text("after")),
        ]));
        assert_eq!(output, "\nbefore\n\nafter\n\n");
    }

    #[test]
    fn test_void_elements_render_nothing() {
        let output = render(doc(vec![
            el("script").with_child(text("alert(1)")),
            el("p").with_child(text("shown")),
            Node::new(crate::NodeKind::Comment).with_child(text("hidden")),
        ]));
        assert_eq!(output, "\nshown\n\n");
    }

    #[test]
    fn test_nested_bullets_rotate() {
        let nested = el("ul").with_child(
            el("li").with_children(vec![
                text("a"),
                el("ul").with_child(el("li").with_children(vec![
                    text("b"),
                    el("ul").with_child(el("li").with_children(vec![
                        text("c"),
                        el("ul").with_child(el("li").with_child(text("d"))),
                    ])),
                ])),
            ]),
        );
        assert_eq!(render(nested), "\n• a\n  ▪ b\n    ◦ c\n      • d\n\n");
    }

    #[test]
    fn test_requested_bullet_type() {
        let list = el("ul")
            .with_attr("type", "square")
            .with_child(el("li").with_child(text("x")));
        assert_eq!(render(list), "\n▪ x\n\n");
    }

    #[test]
    fn test_ordered_list_markers_align() {
        let list = el("ol")
            .with_attr("type", "I")
            .with_attr("start", "3")
            .with_children(vec![
                el("li").with_child(text("x")),
                el("li").with_child(text("y")),
            ]);
        assert_eq!(render(list), "\nIII. x\n IV. y\n\n");
    }

    #[test]
    fn test_reversed_list_and_item_value() {
        let list = el("ol").with_attr("reversed", "").with_children(vec![
            el("li").with_child(text("a")),
            el("li").with_child(text("b")),
            el("li").with_attr("value", "10").with_child(text("c")),
        ]);
        assert_eq!(render(list), "\n 3. a\n 2. b\n10. c\n\n");
    }

    #[test]
    fn test_invalid_start_falls_back() {
        let list = el("ol")
            .with_attr("start", "many")
            .with_child(el("li").with_child(text("a")));
        assert_eq!(render(list), "\n1. a\n\n");
    }

    #[test]
    fn test_extreme_ordinals_are_clamped() {
        let list = el("ol")
            .with_attr("start", "9223372036854775807")
            .with_children(vec![
                el("li").with_child(text("a")),
                el("li").with_child(text("b")),
            ]);
        assert_eq!(render(list), "\n2147483647. a\n2147483648. b\n\n");

        let list = el("ol")
            .with_attr("reversed", "")
            .with_attr("start", "-9223372036854775808")
            .with_children(vec![
                el("li").with_child(text("a")),
                el("li").with_child(text("b")),
            ]);
        assert_eq!(render(list), "\n-2147483648. a\n-2147483649. b\n\n");

        let list = el("ol").with_child(
            el("li")
                .with_attr("value", "-9223372036854775808")
                .with_child(text("a")),
        );
        assert_eq!(render(list), "\n-2147483648. a\n\n");
    }

    #[test]
    fn test_non_ascii_hex_color_renders_unstyled() {
        let document = DocumentParser::from_node(
            el("p").with_attr("color", "#aéaaa").with_child(text("x")),
        );
        let output = DocumentRenderer::new(Theme::default()).render(&document);
        assert_eq!(strip_ansi(&output), "\nx\n\n");
    }

    #[test]
    fn test_loose_and_compact_lists() {
        let items = || {
            vec![
                el("li").with_child(el("p").with_child(text("one"))),
                el("li").with_child(el("p").with_child(text("two"))),
            ]
        };
        assert_eq!(render(el("ul").with_children(items())), "\n• one\n\n• two\n\n");
        assert_eq!(
            render(el("ul").with_attr("compact", "").with_children(items())),
            "\n• one\n• two\n\n"
        );
    }

    #[test]
    fn test_list_item_body_wraps_under_marker() {
        let list = el("ul").with_child(el("li").with_child(text("alpha beta gamma")));
        assert_eq!(render_at(list, 12), "\n• alpha beta\n  gamma\n\n");
    }

    #[test]
    fn test_blockquote_prefixes_every_line() {
        let quote = el("blockquote").with_children(vec![
            el("p").with_child(text("first")),
            el("p").with_child(text("second")),
        ]);
        assert_eq!(render(quote), "\n│ first\n│\n│ second\n\n");
    }

    #[test]
    fn test_preformatted_keeps_whitespace() {
        let pre = el("pre").with_child(text("\nfn main() {\n    run();\n}\n"));
        assert_eq!(render_at(pre, 10), "\n  fn main() {\n      run();\n  }\n\n");
    }

    #[test]
    fn test_definition_list() {
        let list = el("dl").with_children(vec![
            el("dt").with_child(text("Term")),
            el("dd").with_child(text("Meaning")),
        ]);
        assert_eq!(render(list), "\nTerm\n    Meaning\n\n");
    }

    #[test]
    fn test_links_and_images() {
        let output = render(el("p").with_children(vec![
            el("a").with_attr("href", "https://example.com").with_child(text("site")),
            text(" "),
            el("a").with_attr("href", "#top").with_child(text("top")),
            text(" "),
            el("img").with_attr("alt", "logo"),
        ]));
        assert_eq!(output, "\nsite (https://example.com) top [logo]\n\n");
    }

    #[test]
    fn test_horizontal_rule() {
        let output = render_at(doc(vec![el("hr")]), 5);
        assert_eq!(output, "\n─────\n\n");
    }

    fn people_table() -> Node {
        el("table").with_children(vec![
            el("thead").with_child(
                el("tr").with_children(vec![
                    el("th").with_child(text("Name")),
                    el("th").with_child(text("Role")),
                ]),
            ),
            el("tbody").with_children(vec![
                el("tr").with_children(vec![
                    el("td").with_child(text("Ada")),
                    el("td").with_child(text("Engineer")),
                ]),
                el("tr").with_children(vec![
                    el("td").with_child(text("Grace")),
                    el("td").with_child(text("Admiral")),
                ]),
            ]),
        ])
    }

    #[test]
    fn test_table_grid() {
        let expected = "
┌───────┬──────────┐
│ Name  │ Role     │
├───────┼──────────┤
│ Ada   │ Engineer │
│ Grace │ Admiral  │
└───────┴──────────┘

";
        assert_eq!(render(people_table()), expected);
    }

    #[test]
    fn test_narrow_table_is_responsive() {
        let output = render_at(people_table(), 30);
        assert_eq!(
            output,
            "\nName: Ada\nRole: Engineer\n\nName: Grace\nRole: Admiral\n\n"
        );
    }

    #[test]
    fn test_table_row_numbers_and_ascii() {
        let table = people_table()
            .with_attr("row-numbers", "true")
            .with_attr("ascii", "true");
        let expected = "
+---+-------+----------+
| # | Name  | Role     |
+---+-------+----------+
| 1 | Ada   | Engineer |
| 2 | Grace | Admiral  |
+---+-------+----------+

";
        assert_eq!(render(table), expected);
    }

    #[test]
    fn test_first_row_of_th_becomes_header() {
        let table = el("table").with_children(vec![
            el("tr").with_child(el("th").with_child(text("H"))),
            el("tr").with_child(el("td").with_child(text("v"))),
        ]);
        assert_eq!(render_at(table, 20), "\nH: v\n\n");
    }

    #[test]
    fn test_nested_table_renders_responsive() {
        let inner = el("table").with_child(
            el("tr").with_children(vec![
                el("td").with_child(text("x")),
                el("td").with_child(text("y")),
            ]),
        );
        let outer = el("table").with_child(el("tr").with_child(el("td").with_child(inner)));
        let output = render(outer);
        assert!(output.contains("│ Column 1: x │"));
        assert!(output.contains("│ Column 2: y │"));
    }

    #[test]
    fn test_table_caption_is_centered_above() {
        let table = people_table().with_child(el("caption").with_child(text("Staff")));
        let output = render(table);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[1], "       Staff");
        assert!(lines[2].starts_with('┌'));
    }

    #[test]
    fn test_cell_color_priority() {
        let theme = Theme::default();
        let table = el("table")
            .with_attr("alternate-color", "blue")
            .with_attr("column-colors", "green")
            .with_child(el("tbody").with_attr("color", "yellow").with_children(vec![
                el("tr").with_children(vec![
                    el("td").with_attr("color", "red").with_child(text("cell")),
                    el("td").with_child(text("section")),
                ]),
            ]));
        let document = DocumentParser::from_node(table);
        let output = DocumentRenderer::new(theme).render(&document);

        assert!(output.contains("\x1b[31m cell"));
        assert!(output.contains("\x1b[33m section"));
    }

    #[test]
    fn test_colors_are_balanced_and_invisible() {
        let document = DocumentParser::from_node(doc(vec![
            el("h1").with_child(text("Title")),
            el("p").with_children(vec![
                text("plain "),
                el("strong").with_children(vec![text("bold "), el("em").with_child(text("both"))]),
            ]),
        ]));
        let colored = DocumentRenderer::new(Theme::default()).render(&document);
        let plain = DocumentRenderer::new(Theme::plain()).render(&document);

        assert!(colored.contains("\x1b["));
        assert_eq!(strip_ansi(&colored), plain);
        assert_eq!(visual_length(&colored), visual_length(&plain));
    }

    #[test]
    fn test_cache_does_not_change_output() {
        let document = DocumentParser::from_node(doc(vec![
            el("h2").with_child(text("Cached")),
            people_table(),
            el("ul").with_children(vec![
                el("li").with_child(text("one")),
                el("li").with_child(text("two")),
            ]),
        ]));
        let renderer = DocumentRenderer::new(Theme::default()).with_width(60);

        let first = renderer.render(&document);
        let second = renderer.render(&document);
        let fresh = DocumentRenderer::new(Theme::default())
            .with_width(60)
            .render(&document);

        assert_eq!(first, second);
        assert_eq!(first, fresh);
        // The repeated render is served from the memo.
        let (hits, misses) = renderer.cache_stats();
        assert!(hits > 0);
        assert_eq!(misses, 0);
    }

    #[test]
    fn test_cache_is_not_shared_between_documents() {
        let paragraph = |a: &str, b: &str| {
            DocumentParser::from_node(el("p").with_children(vec![text(a), text(b)]))
        };
        let renderer = DocumentRenderer::new(Theme::plain());

        assert_eq!(renderer.render(&paragraph("a", "b")), "\nab\n\n");
        assert_eq!(renderer.render(&paragraph("c", "d")), "\ncd\n\n");
        let (hits, misses) = renderer.cache_stats();
        assert_eq!(hits, 0);
        assert!(misses > 0);
    }

    #[test]
    fn test_theme_markers_and_bullets_from_config() {
        let config = ThemeConfig::from_json(
            r###"{
                "no_color": true,
                "styles": {"h2": {"marker": "## "}, "blockquote": {"marker": "> "}},
                "list": {"bullets": ["*", "-", "+"]}
            }"###,
        )
        .unwrap();
        let document = DocumentParser::from_node(doc(vec![
            el("h2").with_child(text("Section")),
            el("blockquote").with_child(text("quote")),
            el("ul").with_child(el("li").with_child(text("item"))),
        ]));
        let output = DocumentRenderer::new(Theme::from_config(&config)).render(&document);
        assert_eq!(output, "\n## Section\n\n> quote\n\n* item\n\n");
    }

    #[test]
    fn test_render_json_entry_point() {
        let output = render_json(
            r#"[{"tag": "h1", "children": ["Title"]}, {"tag": "p", "children": ["Body"]}]"#,
            Theme::plain(),
            40,
        )
        .unwrap();
        assert_eq!(output, "\nTitle\n\nBody\n\n");
    }
}
