//! Framework signature table and registry.
//!
//! Signatures are registered explicitly at compile time; the registry is
//! an ordinary value constructed once and passed by reference, never a
//! module-level singleton.

/// Structural signature of one agent framework.
///
/// Patterns are case-sensitive substrings matched against import module
/// paths, instantiated class names, and called function names.
#[derive(Clone, Copy, Debug)]
pub struct FrameworkSignature {
    pub name: &'static str,
    pub import_patterns: &'static [&'static str],
    pub class_patterns: &'static [&'static str],
    pub function_patterns: &'static [&'static str],
}

/// Built-in signatures for the supported agent frameworks.
pub const BUILTIN_SIGNATURES: &[FrameworkSignature] = &[
    FrameworkSignature {
        name: "langchain",
        import_patterns: &[
            "langchain",
            "langchain_openai",
            "langchain_anthropic",
            "langchain_community",
        ],
        class_patterns: &["ChatOpenAI", "OpenAI", "ChatAnthropic", "Agent", "AgentExecutor"],
        function_patterns: &[
            "create_react_agent",
            "create_openai_functions_agent",
            "create_structured_chat_agent",
        ],
    },
    FrameworkSignature {
        name: "langgraph",
        import_patterns: &["langgraph"],
        class_patterns: &["StateGraph", "MessageGraph", "CompiledGraph"],
        function_patterns: &["add_node", "add_edge", "compile"],
    },
    FrameworkSignature {
        name: "openai-agents",
        import_patterns: &["openai"],
        class_patterns: &["Agent", "Runner", "Swarm"],
        function_patterns: &[],
    },
    FrameworkSignature {
        name: "pydantic-ai",
        import_patterns: &["pydantic_ai"],
        class_patterns: &["Agent"],
        function_patterns: &[],
    },
    FrameworkSignature {
        name: "crewai",
        import_patterns: &["crewai"],
        class_patterns: &["Agent", "Task", "Crew"],
        function_patterns: &[],
    },
    FrameworkSignature {
        name: "claude-agents",
        import_patterns: &["claude_agent_sdk", "anthropic.agents"],
        class_patterns: &["ClaudeAgent", "Agent"],
        function_patterns: &[],
    },
    FrameworkSignature {
        name: "autogen",
        import_patterns: &["autogen"],
        class_patterns: &["AssistantAgent", "UserProxyAgent", "ConversableAgent"],
        function_patterns: &[],
    },
];

/// Registry of framework signatures consulted during detection.
pub struct SignatureRegistry {
    signatures: Vec<FrameworkSignature>,
}

impl SignatureRegistry {
    /// Registry with only the built-in signatures.
    pub fn builtin() -> Self {
        Self {
            signatures: BUILTIN_SIGNATURES.to_vec(),
        }
    }

    /// Empty registry; signatures must be registered explicitly.
    pub fn empty() -> Self {
        Self {
            signatures: Vec::new(),
        }
    }

    /// Register an additional signature. A signature with a name already
    /// present replaces the earlier entry.
    pub fn register(&mut self, signature: FrameworkSignature) {
        if let Some(existing) = self
            .signatures
            .iter_mut()
            .find(|s| s.name == signature.name)
        {
            *existing = signature;
        } else {
            self.signatures.push(signature);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &FrameworkSignature> {
        self.signatures.iter()
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}

impl Default for SignatureRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_contents() {
        let registry = SignatureRegistry::builtin();
        assert_eq!(registry.len(), 7);
        assert!(registry.iter().any(|s| s.name == "langchain"));
        assert!(registry.iter().any(|s| s.name == "autogen"));
    }

    #[test]
    fn test_register_replaces_by_name() {
        let mut registry = SignatureRegistry::empty();
        registry.register(FrameworkSignature {
            name: "custom",
            import_patterns: &["custom_sdk"],
            class_patterns: &[],
            function_patterns: &[],
        });
        registry.register(FrameworkSignature {
            name: "custom",
            import_patterns: &["custom_sdk_v2"],
            class_patterns: &[],
            function_patterns: &[],
        });
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.iter().next().unwrap().import_patterns,
            &["custom_sdk_v2"]
        );
    }
}
