//! Structural queries over a parsed Python module.
//!
//! Four read-only queries, each a pure function of the parsed source:
//! imports, function definitions, class definitions, and call
//! expressions matching a name pattern. They share no state and may run
//! concurrently on different files.

use tree_sitter::Node;

use crate::models::{CallInfo, ClassInfo, FunctionInfo, ImportInfo};
use crate::parser::ParsedModule;

/// Depth-first visit of every node in the tree.
fn walk<'t>(node: Node<'t>, visit: &mut impl FnMut(Node<'t>)) {
    visit(node);
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            walk(child, visit);
        }
    }
}

fn line_of(node: Node<'_>) -> usize {
    node.start_position().row + 1
}

// ---------------------------------------------------------------------------
// Imports
// ---------------------------------------------------------------------------

/// Find every `import x` and `from x import y [as z]` statement.
///
/// `import a, b` yields one record per module. For `from` imports the
/// alias is recorded when the statement imports exactly one aliased name.
pub fn find_imports(module: &ParsedModule) -> Vec<ImportInfo> {
    let mut imports = Vec::new();

    walk(module.root(), &mut |node| match node.kind() {
        "import_statement" => {
            let line = line_of(node);
            let source = module.line(node.start_position().row).to_string();
            for i in 0..node.named_child_count() {
                let Some(child) = node.named_child(i) else {
                    continue;
                };
                match child.kind() {
                    "dotted_name" => imports.push(ImportInfo {
                        module: module.node_text(child).to_string(),
                        names: Vec::new(),
                        alias: None,
                        line,
                        source: source.clone(),
                    }),
                    "aliased_import" => {
                        let name = child
                            .child_by_field_name("name")
                            .map(|n| module.node_text(n).to_string())
                            .unwrap_or_default();
                        let alias = child
                            .child_by_field_name("alias")
                            .map(|n| module.node_text(n).to_string());
                        imports.push(ImportInfo {
                            module: name,
                            names: Vec::new(),
                            alias,
                            line,
                            source: source.clone(),
                        });
                    }
                    _ => {}
                }
            }
        }
        "import_from_statement" => {
            let line = line_of(node);
            let source = module.line(node.start_position().row).to_string();
            let module_node = node.child_by_field_name("module_name");
            let module_name = module_node
                .map(|n| module.node_text(n).to_string())
                .unwrap_or_default();

            let mut names = Vec::new();
            let mut aliases = Vec::new();
            for i in 0..node.named_child_count() {
                let Some(child) = node.named_child(i) else {
                    continue;
                };
                if module_node.map(|m| m.id()) == Some(child.id()) {
                    continue;
                }
                match child.kind() {
                    "dotted_name" => names.push(module.node_text(child).to_string()),
                    "aliased_import" => {
                        if let Some(name) = child.child_by_field_name("name") {
                            names.push(module.node_text(name).to_string());
                        }
                        if let Some(alias) = child.child_by_field_name("alias") {
                            aliases.push(module.node_text(alias).to_string());
                        }
                    }
                    "wildcard_import" => names.push("*".to_string()),
                    _ => {}
                }
            }

            let alias = if names.len() == 1 {
                aliases.into_iter().next()
            } else {
                None
            };
            imports.push(ImportInfo {
                module: module_name,
                names,
                alias,
                line,
                source,
            });
        }
        _ => {}
    });

    imports
}

// ---------------------------------------------------------------------------
// Function definitions
// ---------------------------------------------------------------------------

/// Decorators attached to a definition via its enclosing
/// `decorated_definition`, outermost first.
fn decorators_of(module: &ParsedModule, node: Node<'_>) -> Vec<String> {
    let Some(parent) = node.parent() else {
        return Vec::new();
    };
    if parent.kind() != "decorated_definition" {
        return Vec::new();
    }
    let mut decorators = Vec::new();
    for i in 0..parent.child_count() {
        if let Some(child) = parent.child(i) {
            if child.kind() == "decorator" {
                decorators.push(module.node_text(child).to_string());
            }
        }
    }
    decorators
}

/// Extract the parameter name from one child of a `parameters` node.
fn parameter_name(module: &ParsedModule, node: Node<'_>) -> Option<String> {
    match node.kind() {
        "identifier" => Some(module.node_text(node).to_string()),
        "default_parameter" | "typed_default_parameter" => node
            .child_by_field_name("name")
            .map(|n| module.node_text(n).to_string()),
        "typed_parameter" | "list_splat_pattern" | "dictionary_splat_pattern" => {
            for i in 0..node.named_child_count() {
                if let Some(child) = node.named_child(i) {
                    if child.kind() == "identifier" {
                        return Some(module.node_text(child).to_string());
                    }
                }
            }
            None
        }
        _ => None,
    }
}

/// Find every function definition, with decorators and parameter names.
pub fn find_function_definitions(module: &ParsedModule) -> Vec<FunctionInfo> {
    let mut functions = Vec::new();

    walk(module.root(), &mut |node| {
        if node.kind() != "function_definition" {
            return;
        }
        let name = node
            .child_by_field_name("name")
            .map(|n| module.node_text(n).to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let mut parameters = Vec::new();
        if let Some(params) = node.child_by_field_name("parameters") {
            for i in 0..params.named_child_count() {
                if let Some(param) = params.named_child(i) {
                    if let Some(name) = parameter_name(module, param) {
                        parameters.push(name);
                    }
                }
            }
        }

        functions.push(FunctionInfo {
            name,
            line: line_of(node),
            decorators: decorators_of(module, node),
            parameters,
            source: module.line(node.start_position().row).to_string(),
        });
    });

    functions
}

// ---------------------------------------------------------------------------
// Class definitions
// ---------------------------------------------------------------------------

/// Find every class definition, with decorators and base-class names.
pub fn find_class_definitions(module: &ParsedModule) -> Vec<ClassInfo> {
    let mut classes = Vec::new();

    walk(module.root(), &mut |node| {
        if node.kind() != "class_definition" {
            return;
        }
        let name = node
            .child_by_field_name("name")
            .map(|n| module.node_text(n).to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let mut bases = Vec::new();
        if let Some(superclasses) = node.child_by_field_name("superclasses") {
            for i in 0..superclasses.named_child_count() {
                if let Some(base) = superclasses.named_child(i) {
                    match base.kind() {
                        "identifier" | "attribute" => {
                            bases.push(module.node_text(base).to_string());
                        }
                        _ => {}
                    }
                }
            }
        }

        classes.push(ClassInfo {
            name,
            line: line_of(node),
            decorators: decorators_of(module, node),
            bases,
            source: module.line(node.start_position().row).to_string(),
        });
    });

    classes
}

// ---------------------------------------------------------------------------
// Call expressions
// ---------------------------------------------------------------------------

/// Find every call whose callee text contains `pattern` as a
/// case-sensitive substring. An empty pattern matches every call.
///
/// The returned source spans the full call, start line through end line,
/// so multi-line argument lists come back intact.
pub fn find_function_calls(module: &ParsedModule, pattern: &str) -> Vec<CallInfo> {
    let mut calls = Vec::new();
    let lines: Vec<&str> = module.source.split('\n').collect();

    walk(module.root(), &mut |node| {
        if node.kind() != "call" {
            return;
        }
        let Some(function) = node.child_by_field_name("function") else {
            return;
        };
        let function_name = module.node_text(function).to_string();
        if !pattern.is_empty() && !function_name.contains(pattern) {
            return;
        }

        let mut arguments = Vec::new();
        if let Some(args) = node.child_by_field_name("arguments") {
            for i in 0..args.named_child_count() {
                if let Some(arg) = args.named_child(i) {
                    if arg.kind() != "comment" {
                        arguments.push(module.node_text(arg).to_string());
                    }
                }
            }
        }

        let start_row = node.start_position().row;
        let end_row = node.end_position().row;
        let source = lines[start_row..=end_row.min(lines.len() - 1)].join("\n");

        calls.push(CallInfo {
            function_name,
            line: start_row + 1,
            arguments,
            source,
        });
    });

    calls
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;

    fn parse(src: &str) -> ParsedModule {
        parse_source(src, "<memory>").unwrap()
    }

    // -- Import tests -------------------------------------------------------

    #[test]
    fn test_find_imports_plain() {
        let module = parse("import os\nimport json\n");
        let imports = find_imports(&module);
        assert_eq!(imports.len(), 2);
        assert_eq!(imports[0].module, "os");
        assert_eq!(imports[0].line, 1);
        assert_eq!(imports[0].source, "import os");
        assert!(imports[0].names.is_empty());
        assert_eq!(imports[1].module, "json");
        assert_eq!(imports[1].line, 2);
    }

    #[test]
    fn test_find_imports_aliased() {
        let module = parse("import numpy as np\n");
        let imports = find_imports(&module);
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].module, "numpy");
        assert_eq!(imports[0].alias.as_deref(), Some("np"));
    }

    #[test]
    fn test_find_imports_multiple_modules_one_statement() {
        let module = parse("import os, sys\n");
        let imports = find_imports(&module);
        assert_eq!(imports.len(), 2);
        assert_eq!(imports[0].module, "os");
        assert_eq!(imports[1].module, "sys");
        assert_eq!(imports[1].line, 1);
    }

    #[test]
    fn test_find_imports_from() {
        let module = parse("from langchain_openai import ChatOpenAI\n");
        let imports = find_imports(&module);
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].module, "langchain_openai");
        assert_eq!(imports[0].names, vec!["ChatOpenAI"]);
        assert_eq!(imports[0].alias, None);
    }

    #[test]
    fn test_find_imports_from_aliased() {
        let module = parse("from langfuse.callback import CallbackHandler as Handler\n");
        let imports = find_imports(&module);
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].module, "langfuse.callback");
        assert_eq!(imports[0].names, vec!["CallbackHandler"]);
        assert_eq!(imports[0].alias.as_deref(), Some("Handler"));
    }

    #[test]
    fn test_find_imports_from_multiple_names() {
        let module = parse("from typing import List, Dict, Optional\n");
        let imports = find_imports(&module);
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].names, vec!["List", "Dict", "Optional"]);
    }

    #[test]
    fn test_find_imports_relative() {
        let module = parse("from .utils import helper\n");
        let imports = find_imports(&module);
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].module, ".utils");
        assert_eq!(imports[0].names, vec!["helper"]);
    }

    #[test]
    fn test_find_imports_wildcard() {
        let module = parse("from os.path import *\n");
        let imports = find_imports(&module);
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].names, vec!["*"]);
    }

    #[test]
    fn test_find_imports_nested_in_function() {
        let module = parse("def lazy():\n    import heavy_module\n");
        let imports = find_imports(&module);
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].module, "heavy_module");
        assert_eq!(imports[0].line, 2);
    }

    // -- Function definition tests ------------------------------------------

    #[test]
    fn test_find_functions_basic() {
        let module = parse("def run(agent, query):\n    return agent(query)\n");
        let functions = find_function_definitions(&module);
        assert_eq!(functions.len(), 1);
        assert_eq!(functions[0].name, "run");
        assert_eq!(functions[0].line, 1);
        assert_eq!(functions[0].parameters, vec!["agent", "query"]);
        assert!(functions[0].decorators.is_empty());
        assert_eq!(functions[0].source, "def run(agent, query):");
    }

    #[test]
    fn test_find_functions_decorated() {
        let module = parse("@observe()\n@tool\ndef search(query: str) -> str:\n    pass\n");
        let functions = find_function_definitions(&module);
        assert_eq!(functions.len(), 1);
        assert_eq!(functions[0].name, "search");
        assert_eq!(functions[0].line, 3);
        assert_eq!(functions[0].decorators, vec!["@observe()", "@tool"]);
        assert_eq!(functions[0].parameters, vec!["query"]);
    }

    #[test]
    fn test_find_functions_default_and_splat_params() {
        let module = parse("def f(a, b=1, *args, **kwargs):\n    pass\n");
        let functions = find_function_definitions(&module);
        assert_eq!(functions[0].parameters, vec!["a", "b", "args", "kwargs"]);
    }

    #[test]
    fn test_find_functions_methods_included() {
        let module = parse("class A:\n    def method(self):\n        pass\n");
        let functions = find_function_definitions(&module);
        assert_eq!(functions.len(), 1);
        assert_eq!(functions[0].name, "method");
        assert_eq!(functions[0].line, 2);
        assert_eq!(functions[0].parameters, vec!["self"]);
    }

    // -- Class definition tests ---------------------------------------------

    #[test]
    fn test_find_classes_with_bases() {
        let module = parse("class MyAgent(BaseAgent, mixins.Loggable):\n    pass\n");
        let classes = find_class_definitions(&module);
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].name, "MyAgent");
        assert_eq!(classes[0].bases, vec!["BaseAgent", "mixins.Loggable"]);
    }

    #[test]
    fn test_find_classes_decorated() {
        let module = parse("@dataclass\nclass Point:\n    x: int\n");
        let classes = find_class_definitions(&module);
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].decorators, vec!["@dataclass"]);
        assert_eq!(classes[0].line, 2);
    }

    // -- Call expression tests ----------------------------------------------

    #[test]
    fn test_find_calls_pattern_filter() {
        let module = parse("agent = ChatOpenAI(model=\"gpt-4\")\nprint(agent)\n");
        let calls = find_function_calls(&module, "ChatOpenAI");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].function_name, "ChatOpenAI");
        assert_eq!(calls[0].line, 1);
        assert_eq!(calls[0].arguments, vec!["model=\"gpt-4\""]);
    }

    #[test]
    fn test_find_calls_substring_match() {
        let module = parse("create_react_agent(llm, tools)\n");
        let calls = find_function_calls(&module, "react");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].arguments, vec!["llm", "tools"]);
    }

    #[test]
    fn test_find_calls_empty_pattern_matches_all() {
        let module = parse("a()\nb(1)\n");
        let calls = find_function_calls(&module, "");
        assert_eq!(calls.len(), 2);
    }

    #[test]
    fn test_find_calls_method_callee() {
        let module = parse("client.chat.completions.create(model=\"gpt-4\")\n");
        let calls = find_function_calls(&module, "create");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].function_name, "client.chat.completions.create");
    }

    #[test]
    fn test_find_calls_multiline_source_spans_full_call() {
        let module = parse("result = run_agent(\n    x,\n    y\n)\n");
        let calls = find_function_calls(&module, "run_agent");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].line, 1);
        assert_eq!(calls[0].source, "result = run_agent(\n    x,\n    y\n)");
        assert_eq!(calls[0].arguments, vec!["x", "y"]);
    }

    #[test]
    fn test_find_calls_case_sensitive() {
        let module = parse("agent = Agent()\n");
        assert_eq!(find_function_calls(&module, "agent").len(), 0);
        assert_eq!(find_function_calls(&module, "Agent").len(), 1);
    }
}
