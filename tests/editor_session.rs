//! Editor sessions persisted to a directory store

use std::fs;

use pointlabel::grammar::variant::IMPORTED_STRING;
use pointlabel::persistence::FileStore;
use pointlabel::serializer::{encode_tree, Mode};
use pointlabel::workspace::Attachment;
use pointlabel::{Editor, GrammarNode, NodeId, TestCorpus, UiVariant};

fn grammar_json() -> String {
    let tree = GrammarNode::sequence(
        NodeId::new("root"),
        vec![GrammarNode::rest(NodeId::new("tail"), "Point").unwrap()],
    );
    encode_tree(&tree, Mode::Internal).to_json_pretty()
}

#[test]
fn session_state_survives_reopening() {
    let dir = tempfile::tempdir().unwrap();

    let mut editor = Editor::open(FileStore::new(dir.path()));
    editor.load_grammar(&grammar_json()).unwrap();
    let pairs = vec![("AHU".to_string(), "Equip".to_string())];
    let choice = editor
        .import_pairs(
            &pairs,
            Some(Attachment::at(NodeId::new("root"), 0)),
            &UiVariant::new(IMPORTED_STRING),
        )
        .unwrap();
    editor.set_corpus(TestCorpus::new(vec!["AHU-1".into()]));
    editor.close();

    let reopened = Editor::open(FileStore::new(dir.path()));
    let workspace = reopened.workspace();
    assert_eq!(workspace.len(), 4);
    assert_eq!(
        workspace.get(&NodeId::new("root")).unwrap().children(),
        &[choice.clone(), NodeId::new("tail")]
    );
    let child = &workspace.get(&choice).unwrap().children()[0];
    assert_eq!(workspace.get(child).unwrap().ui_variant.as_str(), IMPORTED_STRING);
    assert_eq!(reopened.corpus().labels(), &["AHU-1"]);
}

#[test]
fn corrupt_files_start_an_empty_session() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("state.json"), "{\"parser\":").unwrap();
    fs::write(dir.path().join("pointLabels.json"), "[1, 2]").unwrap();

    let editor = Editor::open(FileStore::new(dir.path()));
    assert!(editor.workspace().is_empty());
    assert!(editor.corpus().is_empty());
}

#[test]
fn reset_removes_the_saved_grammar() {
    let dir = tempfile::tempdir().unwrap();
    let mut editor = Editor::open(FileStore::new(dir.path()));
    editor.load_grammar(&grammar_json()).unwrap();
    assert!(dir.path().join("state.json").exists());

    editor.reset();
    assert!(!dir.path().join("state.json").exists());
    assert_eq!(
        fs::read_to_string(dir.path().join("pointLabels.json")).unwrap(),
        "[]"
    );
}

#[test]
fn unattached_import_survives_reopening() {
    let dir = tempfile::tempdir().unwrap();

    let mut editor = Editor::open(FileStore::new(dir.path()));
    editor.load_grammar(&grammar_json()).unwrap();
    let pairs = vec![("VAV".to_string(), "Box".to_string())];
    let choice = editor
        .import_pairs(&pairs, None, &UiVariant::new(IMPORTED_STRING))
        .unwrap();
    assert_eq!(editor.workspace().len(), 4);
    editor.close();

    let reopened = Editor::open(FileStore::new(dir.path()));
    let workspace = reopened.workspace();
    assert_eq!(workspace.len(), 4);
    assert!(workspace.contains(&choice));
    assert_eq!(workspace.root().unwrap().id, NodeId::new("root"));
    assert_eq!(workspace.top_level(), &[NodeId::new("root"), choice]);
}
