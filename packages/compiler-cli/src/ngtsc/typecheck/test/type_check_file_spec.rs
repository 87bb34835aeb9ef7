use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use ngtcb_compiler::render3::r3_ast::R3Node;

use super::super::api::{TypeCheckBlockMetadata, TypeCheckingConfig};
use super::super::testing::{
    bind_plain, class, component, direct_mapping, pipe, ref_emitter, TestTemplate, SHIM_FILE,
};
use super::super::{
    OutOfBandDiagnosticRecorderImpl, RegistryDomSchemaChecker, TcbGenericContextBehavior,
    TemplateSourceManager, TypeCheckFile,
};
use crate::ngtsc::imports::Reference;
use crate::ngtsc::reflection::{ClassDeclaration, ReflectionHost};
use crate::ngtsc::testing::TestReflectionHost;

struct Shim {
    file: TypeCheckFile,
    source_manager: Rc<RefCell<TemplateSourceManager>>,
    dom: RegistryDomSchemaChecker,
    oob: OutOfBandDiagnosticRecorderImpl,
}

impl Shim {
    fn new() -> Self {
        let reflector: Rc<dyn ReflectionHost> = Rc::new(TestReflectionHost::new());
        let source_manager = Rc::new(RefCell::new(TemplateSourceManager::new()));
        Shim {
            file: TypeCheckFile::new(SHIM_FILE, TypeCheckingConfig::default(), ref_emitter(), reflector),
            dom: RegistryDomSchemaChecker::new(Rc::clone(&source_manager)),
            oob: OutOfBandDiagnosticRecorderImpl::new(Rc::clone(&source_manager)),
            source_manager,
        }
    }

    fn add(
        &mut self,
        node: Rc<ClassDeclaration>,
        tpl: &TestTemplate,
        nodes: Vec<R3Node>,
        pipes: IndexMap<String, Reference>,
    ) -> TypeCheckBlockMetadata {
        let id = self
            .source_manager
            .borrow_mut()
            .capture_source(&node, direct_mapping(tpl), tpl.file.clone());
        let meta = TypeCheckBlockMetadata {
            id,
            bound_target: bind_plain(nodes),
            pipes,
            schemas: vec![],
        };
        self.file
            .add_type_check_block(
                &Reference::new(node),
                &meta,
                &mut self.dom,
                &mut self.oob,
                TcbGenericContextBehavior::UseEmitter,
            )
            .unwrap();
        meta
    }
}

fn name_template() -> (TestTemplate, Vec<R3Node>) {
    let tpl = TestTemplate::new("{{name}}");
    let nodes = vec![tpl.bound_text(tpl.read("name", 0))];
    (tpl, nodes)
}

#[test]
fn test_empty_shim_is_still_a_module() {
    let shim = Shim::new();
    assert!(shim.file.is_empty());
    assert_eq!(shim.file.file_name(), SHIM_FILE);

    let (text, blocks) = shim.file.render(false);
    assert!(blocks.is_empty());
    assert_eq!(text.trim(), "export const IS_A_MODULE = true;");
}

#[test]
fn test_blocks_are_numbered_and_located() {
    let mut shim = Shim::new();
    let (tpl, nodes) = name_template();
    let first = shim.add(component(), &tpl, nodes.clone(), IndexMap::new());
    let second = shim.add(class(2, "Other", "other").build(), &tpl, nodes, IndexMap::new());
    assert!(!shim.file.is_empty());
    assert!(shim.file.type_check_block(&first.id).is_some());

    let (text, blocks) = shim.file.render(false);
    assert!(text.starts_with("import * as i0 from './test';\nimport * as i1 from './other';\n\n"));
    assert!(text[blocks[&first.id].offset..].starts_with("/*tcb1*/\nfunction _tcb1(ctx: i0.Test)"));
    assert!(text[blocks[&second.id].offset..].starts_with("/*tcb2*/\nfunction _tcb2(ctx: i1.Other)"));
    assert!(blocks[&first.id].offset < blocks[&second.id].offset);
}

#[test]
fn test_pipe_instances_are_hoisted_once() {
    let mut shim = Shim::new();
    let tpl = TestTemplate::new("{{name | upper}}");
    let piped = tpl.pipe(tpl.read("name", 0), "upper", vec![]);
    let nodes = vec![tpl.bound_text(piped)];
    let mut pipes = IndexMap::new();
    pipes.insert("upper".to_string(), pipe(3, "UpperPipe"));

    let first = shim.add(component(), &tpl, nodes.clone(), pipes.clone());
    shim.add(class(2, "Other", "other").build(), &tpl, nodes, pipes);

    let (text, blocks) = shim.file.render(true);
    assert_eq!(text.matches("var _pipe1: ").count(), 1);
    assert!(!text.contains("_pipe2"));
    assert_eq!(text.matches("_pipe1.transform(").count(), 2);
    // The prelude comes before every block.
    assert!(text.find("var _pipe1").unwrap() < blocks[&first.id].offset);
}

#[test]
fn test_render_without_comments() {
    let mut shim = Shim::new();
    let (tpl, nodes) = name_template();
    let meta = shim.add(component(), &tpl, nodes, IndexMap::new());

    let (annotated, _) = shim.file.render(false);
    let (plain, blocks) = shim.file.render(true);
    assert!(annotated.contains("/*tcb1*/"));
    assert!(!plain.contains("/*"));
    assert!(plain[blocks[&meta.id].offset..].starts_with("function _tcb1(ctx: i0.Test) {"));
}
