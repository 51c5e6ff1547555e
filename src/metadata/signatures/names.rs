//! Reflection-style type names, e.g. `System.Collections.Generic.List`1[System.String]`.
//!
//! Class and value type references are only tokens in a signature; turning them into
//! names needs the module's TypeDef / TypeRef / TypeSpec tables, which live outside
//! this crate. Callers plug that lookup in through [`TokenResolver`].

use std::collections::HashMap;

use crate::metadata::{
    signatures::{MethodSignature, TypeNode},
    token::Token,
};

/// Resolves type tokens to fully qualified type names.
///
/// # Examples
///
/// ```rust
/// use std::collections::HashMap;
/// use cilsig::{metadata::signatures::parse_method_signature, Token};
///
/// let mut names = HashMap::new();
/// names.insert(Token::new(0x0100_0012), "System.Text.StringBuilder".to_string());
///
/// // void (class StringBuilder, int32[])
/// let method = parse_method_signature(&[0x00, 0x02, 0x01, 0x12, 0x49, 0x1D, 0x08])?;
/// assert_eq!(
///     method.parameter_type_names(&names),
///     "System.Text.StringBuilder,System.Int32[]"
/// );
/// # Ok::<(), cilsig::Error>(())
/// ```
pub trait TokenResolver {
    /// The fully qualified name of the type `token` refers to, if known.
    fn resolve(&self, token: Token) -> Option<String>;
}

impl TokenResolver for HashMap<Token, String> {
    fn resolve(&self, token: Token) -> Option<String> {
        self.get(&token).cloned()
    }
}

impl<R: TokenResolver + ?Sized> TokenResolver for &R {
    fn resolve(&self, token: Token) -> Option<String> {
        (**self).resolve(token)
    }
}

/// A resolver that knows no tokens; every reference renders as its hex value.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnresolvedTokens;

impl TokenResolver for UnresolvedTokens {
    fn resolve(&self, _token: Token) -> Option<String> {
        None
    }
}

fn token_name(token: Token, resolver: &dyn TokenResolver) -> String {
    resolver
        .resolve(token)
        .unwrap_or_else(|| token.to_string())
}

fn join_names(types: &[TypeNode], resolver: &dyn TokenResolver) -> String {
    types
        .iter()
        .map(|node| node.type_name_dyn(resolver))
        .collect::<Vec<_>>()
        .join(",")
}

impl TypeNode {
    /// The reflection-style name of this type.
    ///
    /// Custom modifiers and `pinned` are not part of a type's name and are dropped.
    /// Tokens the resolver does not know render as hex.
    ///
    /// | Type                              | Name                   |
    /// |-----------------------------------|------------------------|
    /// | `int32`                           | `System.Int32`         |
    /// | `string[]`                        | `System.String[]`      |
    /// | `int32[,]`                        | `System.Int32[,]`      |
    /// | `int32&`, `int32*`                | `System.Int32&`, `System.Int32*` |
    /// | `!0`, `!!0`                       | `!0`, `!!0`            |
    /// | `class List<string>`              | `List[System.String]`  |
    #[must_use]
    pub fn type_name<R: TokenResolver>(&self, resolver: &R) -> String {
        self.type_name_dyn(resolver)
    }

    fn type_name_dyn(&self, resolver: &dyn TokenResolver) -> String {
        match self {
            TypeNode::Primitive(kind) => kind.system_name().to_string(),
            TypeNode::Class(token) | TypeNode::ValueType(token) => token_name(*token, resolver),
            TypeNode::SzArray(inner) => format!("{}[]", inner.type_name_dyn(resolver)),
            TypeNode::Array(array) => {
                let shape = if array.rank == 1 {
                    "*".to_string()
                } else {
                    ",".repeat((array.rank as usize).saturating_sub(1))
                };
                format!("{}[{}]", array.element.type_name_dyn(resolver), shape)
            }
            TypeNode::Ptr(inner) => format!("{}*", inner.type_name_dyn(resolver)),
            TypeNode::ByRef(inner) => format!("{}&", inner.type_name_dyn(resolver)),
            TypeNode::Pinned(inner) => inner.type_name_dyn(resolver),
            TypeNode::Modified(modified) => modified.inner.type_name_dyn(resolver),
            TypeNode::GenericParam {
                index,
                method: false,
            } => format!("!{index}"),
            TypeNode::GenericParam { index, method: true } => format!("!!{index}"),
            TypeNode::GenericInst(inst) => format!(
                "{}[{}]",
                token_name(inst.base, resolver),
                join_names(&inst.args, resolver)
            ),
            TypeNode::FnPtr(method) => format!(
                "{} *({})",
                method.return_type.type_name_dyn(resolver),
                join_names(&method.params, resolver)
            ),
        }
    }
}

impl MethodSignature {
    /// The names of all parameters, fixed and vararg, joined with `,`.
    ///
    /// This is the form instrumentation targets list a method's parameters in, so
    /// overloads can be told apart by comparing strings.
    #[must_use]
    pub fn parameter_type_names<R: TokenResolver>(&self, resolver: &R) -> String {
        join_names(&self.params, resolver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::signatures::{parse_method_signature, parse_type_spec_signature};

    fn name(blob: &[u8], resolver: &impl TokenResolver) -> String {
        parse_type_spec_signature(blob)
            .unwrap()
            .base
            .type_name(resolver)
    }

    #[test]
    fn test_type_names() {
        let mut names = HashMap::new();
        names.insert(
            Token::new(0x1B00_000A),
            "System.Collections.Generic.Dictionary`2".to_string(),
        );

        assert_eq!(name(&[0x08], &names), "System.Int32");
        assert_eq!(name(&[0x1D, 0x0E], &names), "System.String[]");
        assert_eq!(name(&[0x14, 0x08, 0x01, 0x00, 0x00], &names), "System.Int32[*]");
        assert_eq!(name(&[0x14, 0x08, 0x03, 0x00, 0x00], &names), "System.Int32[,,]");
        assert_eq!(name(&[0x10, 0x13, 0x00], &names), "!0&");
        assert_eq!(name(&[0x0F, 0x1E, 0x02], &names), "!!2*");
        assert_eq!(name(&[0x45, 0x1F, 0x42, 0x1C], &names), "System.Object");
        assert_eq!(
            name(&[0x15, 0x12, 0x2A, 0x02, 0x0E, 0x08], &names),
            "System.Collections.Generic.Dictionary`2[System.String,System.Int32]"
        );
        assert_eq!(
            name(&[0x1B, 0x00, 0x01, 0x01, 0x18], &names),
            "System.Void *(System.IntPtr)"
        );
    }

    #[test]
    fn test_unresolved_tokens() {
        assert_eq!(name(&[0x11, 0x34], &UnresolvedTokens), "0x0200000d");
    }

    #[test]
    fn test_parameter_type_names() {
        let method = parse_method_signature(&[0x00, 0x00, 0x01]).unwrap();
        assert_eq!(method.parameter_type_names(&UnresolvedTokens), "");

        // vararg void (int32, ..., string)
        let method = parse_method_signature(&[0x05, 0x02, 0x01, 0x08, 0x41, 0x0E]).unwrap();
        assert_eq!(
            method.parameter_type_names(&UnresolvedTokens),
            "System.Int32,System.String"
        );
    }
}
