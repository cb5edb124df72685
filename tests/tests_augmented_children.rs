//! Augmented Child Sequence Tests
//!
//! These tests drive the comment-augmented child view through the public
//! document facade: scanner behavior per container category, exact
//! positions, and the body-text round-trip property.

#![allow(clippy::unwrap_used)]
use rstest::rstest;

use std::sync::Arc;

use regraft::parser::ReferenceParser;
use regraft::{CommentKind, FacadeElement, FileId, SourceDocument, SyntaxKind};

fn document(text: &str) -> SourceDocument {
    SourceDocument::new(FileId::new(0), text, Arc::new(ReferenceParser))
}

fn shape(elements: &[FacadeElement], doc: &SourceDocument) -> Vec<(String, u32, u32)> {
    elements
        .iter()
        .map(|element| match element {
            FacadeElement::Node(node) => {
                let range = doc.range_of(node).unwrap();
                (
                    format!("{:?}", node.kind().unwrap()),
                    range.start().into(),
                    range.end().into(),
                )
            }
            FacadeElement::Comment(comment) => (
                "Comment".to_string(),
                comment.range().start().into(),
                comment.range().end().into(),
            ),
        })
        .collect()
}

#[test]
fn test_file_root_positions_are_exact() {
    let doc = document("// a\nlet a;\n//b");
    let root = doc.root();
    let children = doc.augmented_children(&root).unwrap();

    assert_eq!(
        shape(&children, &doc),
        vec![
            ("Comment".to_string(), 0, 4),
            ("VariableStatement".to_string(), 0, 11),
            ("Comment".to_string(), 12, 15),
        ]
    );

    let first = children[0].as_comment().unwrap();
    assert_eq!(first.kind(), CommentKind::Line);
    assert_eq!(first.text(), "// a");
    let last = children[2].as_comment().unwrap();
    assert_eq!(last.text(), "//b");
}

#[test]
fn test_comments_sharing_code_lines_never_appear() {
    let doc = document("/*a*/let a;/*b*/let b;");
    let root = doc.root();
    let children = doc.augmented_children(&root).unwrap();

    assert_eq!(children.len(), 2);
    assert!(children.iter().all(|c| c.as_node().is_some()));
}

#[test]
fn test_class_member_view_drops_flanking_comments() {
    let doc = document("class c {\n/*a*/p;/*b*/ //c\n}");
    let root = doc.root();
    let class = doc.children_of(&root).unwrap().remove(0);
    assert_eq!(class.kind().unwrap(), SyntaxKind::ClassDeclaration);

    let members = doc.augmented_children(&class).unwrap();
    assert_eq!(members.len(), 1);
    let prop = members[0].as_node().unwrap();
    assert_eq!(prop.kind().unwrap(), SyntaxKind::PropertyDeclaration);
    assert_eq!(doc.text_of(prop).unwrap(), "p;");
}

#[test]
fn test_childless_container_equals_scan_output() {
    let doc = document("class c {\n// one\n/* two */\n// three\n}");
    let root = doc.root();
    let class = doc.children_of(&root).unwrap().remove(0);

    let members = doc.augmented_children(&class).unwrap();
    assert_eq!(members.len(), 3);
    let mut previous_end = 0u32;
    for member in &members {
        let comment = member.as_comment().unwrap();
        let start: u32 = comment.range().start().into();
        assert!(start >= previous_end, "comments must ascend in position");
        previous_end = comment.range().end().into();
    }
}

#[rstest]
#[case("enum E {\n// e\nA,\n}", SyntaxKind::EnumDeclaration)]
#[case("interface I {\n// i\na: string;\n}", SyntaxKind::InterfaceDeclaration)]
fn test_member_containers_surface_their_comments(
    #[case] text: &str,
    #[case] kind: SyntaxKind,
) {
    let doc = document(text);
    let root = doc.root();
    let container = doc.children_of(&root).unwrap().remove(0);
    assert_eq!(container.kind().unwrap(), kind);

    let children = doc.augmented_children(&container).unwrap();
    assert_eq!(children.len(), 2);
    assert!(children[0].as_comment().is_some());
    assert!(children[1].as_node().is_some());
}

#[test]
fn test_object_literal_and_nested_containers() {
    let doc = document("let o = {\n// head\na: 1,\nb: {\n// inner\nc: 2,\n},\n};");
    let root = doc.root();
    let var = doc.children_of(&root).unwrap().remove(0);
    let object = doc
        .children_of(&var)
        .unwrap()
        .into_iter()
        .find(|c| c.kind().unwrap() == SyntaxKind::ObjectLiteral)
        .unwrap();

    let elements = doc.augmented_children(&object).unwrap();
    assert_eq!(elements.len(), 3);
    assert_eq!(elements[0].as_comment().unwrap().text(), "// head");

    let nested = elements[2].as_node().unwrap();
    let inner_object = doc
        .children_of(nested)
        .unwrap()
        .into_iter()
        .find(|c| c.kind().unwrap() == SyntaxKind::ObjectLiteral)
        .unwrap();
    let inner = doc.augmented_children(&inner_object).unwrap();
    assert_eq!(inner.len(), 2);
    assert_eq!(inner[0].as_comment().unwrap().text(), "// inner");
}

#[test]
fn test_switch_clause_comments() {
    let doc = document("switch (x) {\ncase 1:\n// first\nlet a;\ndefault:\n// second\n}");
    let root = doc.root();
    let switch = doc.children_of(&root).unwrap().remove(0);
    let clauses: Vec<_> = doc
        .children_of(&switch)
        .unwrap()
        .into_iter()
        .filter(|c| {
            matches!(
                c.kind().unwrap(),
                SyntaxKind::CaseClause | SyntaxKind::DefaultClause
            )
        })
        .collect();
    assert_eq!(clauses.len(), 2);

    let case = doc.augmented_children(&clauses[0]).unwrap();
    assert_eq!(case.len(), 2);
    assert_eq!(case[0].as_comment().unwrap().text(), "// first");

    let default = doc.augmented_children(&clauses[1]).unwrap();
    assert_eq!(default.len(), 1);
    assert_eq!(default[0].as_comment().unwrap().text(), "// second");
}

#[test]
fn test_round_trip_reassembles_body_text() {
    let text = "// head\nlet a;\n\n/* mid */\nclass c {\np;\n}\n// tail";
    let doc = document(text);
    let root = doc.root();
    let children = doc.augmented_children(&root).unwrap();

    let mut rebuilt = String::new();
    let mut cursor = 0usize;
    for element in &children {
        let (start, end): (usize, usize) = match element {
            FacadeElement::Comment(comment) => (
                comment.range().start().into(),
                comment.range().end().into(),
            ),
            FacadeElement::Node(node) => {
                let range = doc.token_range_of(node).unwrap();
                (range.start().into(), range.end().into())
            }
        };
        rebuilt.push_str(&text[cursor..start]);
        rebuilt.push_str(&text[start..end]);
        cursor = end;
    }
    rebuilt.push_str(&text[cursor..]);
    assert_eq!(rebuilt, text, "no loss, no duplication");
}

#[test]
fn test_doc_comment_ownership() {
    // Followed by a member: the member claims the doc comment.
    let doc = document("class c {\n/** owned */\np;\n}");
    let root = doc.root();
    let class = doc.children_of(&root).unwrap().remove(0);
    let members = doc.augmented_children(&class).unwrap();
    assert_eq!(members.len(), 1);
    assert!(members[0].as_node().is_some());

    // Nothing follows: the container captures it.
    let doc = document("class c {\n/** unowned */\n}");
    let root = doc.root();
    let class = doc.children_of(&root).unwrap().remove(0);
    let members = doc.augmented_children(&class).unwrap();
    assert_eq!(members.len(), 1);
    let comment = members[0].as_comment().unwrap();
    assert!(comment.is_doc());
    assert_eq!(comment.kind(), CommentKind::Block);
}
