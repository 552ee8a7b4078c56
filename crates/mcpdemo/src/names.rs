//! Closed sets of capability names.
//!
//! The host registers one handler per variant and the client addresses
//! capabilities through the same enums, so a name can never drift between
//! the two sides.

use std::fmt;

macro_rules! capability_names {
    (
        $(#[$meta:meta])*
        $ty:ident {
            $($(#[$vmeta:meta])* $variant:ident => $name:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $ty {
            $($(#[$vmeta])* $variant,)+
        }

        impl $ty {
            /// Every variant, in registration order.
            pub const ALL: &'static [$ty] = &[$($ty::$variant,)+];

            /// The wire name of this capability.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $($ty::$variant => $name,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

capability_names! {
    /// Tools the demo host exposes.
    ToolName {
        /// Integer addition.
        Add => "add",
        /// The Latin text mangler.
        AncientLatinText => "ancient_latin_text",
    }
}

capability_names! {
    /// Resources the demo host exposes.
    ResourceName {
        /// The Greek gods table.
        GreekGods => "greek_gods",
        /// The Latin mangler as a resource.
        AncientLatinText => "ancient_latin_text",
        /// Personalized greeting.
        Greeting => "greeting",
    }
}

capability_names! {
    /// Prompts the demo host exposes.
    PromptName {
        /// MCP explainer.
        McpExpert => "mcp_expert",
        /// Code review request.
        CodeReview => "code_review",
        /// Commit message request.
        GitCommit => "git_commit",
    }
}

impl ResourceName {
    /// The URI (for static resources) or URI template this resource answers.
    #[must_use]
    pub const fn uri_pattern(self) -> &'static str {
        match self {
            ResourceName::GreekGods => "gods://",
            ResourceName::AncientLatinText => "ancientlatin://{text}",
            ResourceName::Greeting => "greeting://{name}",
        }
    }

    /// Whether the URI carries `{placeholder}` segments.
    #[must_use]
    pub const fn is_template(self) -> bool {
        !matches!(self, ResourceName::GreekGods)
    }
}
