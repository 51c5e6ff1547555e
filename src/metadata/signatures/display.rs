//! ILAsm-like text rendering of decoded signatures.
//!
//! Tokens are printed as hex, since resolving them needs metadata tables this crate
//! never sees. For reflection-style names with resolved tokens, see
//! [`TypeNode::type_name`].

use std::fmt;

use crate::metadata::signatures::{
    CallingConvention, FieldSignature, LocalVariableSignature, MethodSignature,
    MethodSpecSignature, PropertySignature, SignatureArray, TypeNode, TypeSpecSignature,
};

/// Writes `items` separated by `", "`.
fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// `[lo...hi, ...]`, one entry per dimension.
fn write_array_shape(f: &mut fmt::Formatter<'_>, array: &SignatureArray) -> fmt::Result {
    f.write_str("[")?;
    for dimension in 0..array.rank as usize {
        if dimension > 0 {
            f.write_str(",")?;
        }

        let size = array.sizes.get(dimension).copied();
        let lower = array.lower_bounds.get(dimension).copied();
        match (lower, size) {
            (Some(lower), Some(size)) => {
                let upper = i64::from(lower) + i64::from(size) - 1;
                write!(f, "{lower}...{upper}")?;
            }
            (Some(lower), None) => write!(f, "{lower}...")?,
            (None, Some(size)) => write!(f, "{size}")?,
            (None, None) => {}
        }
    }
    f.write_str("]")
}

/// `instance explicit vararg int32 <[1]> *(string, ..., int32)`
fn write_method(f: &mut fmt::Formatter<'_>, method: &MethodSignature, pointer: bool) -> fmt::Result {
    if method.has_this {
        f.write_str("instance ")?;
    }
    if method.explicit_this {
        f.write_str("explicit ")?;
    }
    if method.calling_convention != CallingConvention::Default {
        write!(f, "{} ", method.calling_convention)?;
    }

    write!(f, "{}", method.return_type)?;
    if method.generic {
        write!(f, " <[{}]>", method.generic_param_count)?;
    }
    f.write_str(if pointer { " *(" } else { " (" })?;

    write_list(f, method.fixed_params())?;
    if method.sentinel.is_some() {
        if !method.fixed_params().is_empty() {
            f.write_str(", ")?;
        }
        f.write_str("...")?;
        for param in method.vararg_params() {
            write!(f, ", {param}")?;
        }
    }
    f.write_str(")")
}

impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeNode::Primitive(kind) => write!(f, "{kind}"),
            TypeNode::Class(token) => write!(f, "class {token}"),
            TypeNode::ValueType(token) => write!(f, "valuetype {token}"),
            TypeNode::SzArray(inner) => write!(f, "{inner}[]"),
            TypeNode::Array(array) => {
                write!(f, "{}", array.element)?;
                write_array_shape(f, array)
            }
            TypeNode::Ptr(inner) => write!(f, "{inner}*"),
            TypeNode::ByRef(inner) => write!(f, "{inner}&"),
            TypeNode::Pinned(inner) => write!(f, "{inner} pinned"),
            TypeNode::GenericParam {
                index,
                method: false,
            } => write!(f, "!{index}"),
            TypeNode::GenericParam { index, method: true } => write!(f, "!!{index}"),
            TypeNode::GenericInst(inst) => {
                let keyword = if inst.value_type { "valuetype" } else { "class" };
                write!(f, "{keyword} {}<", inst.base)?;
                write_list(f, &inst.args)?;
                f.write_str(">")
            }
            TypeNode::FnPtr(method) => {
                f.write_str("method ")?;
                write_method(f, method, true)
            }
            TypeNode::Modified(modified) => {
                let keyword = if modified.required { "modreq" } else { "modopt" };
                write!(f, "{} {keyword}({})", modified.inner, modified.modifier)
            }
        }
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_method(f, self, false)
    }
}

impl fmt::Display for FieldSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field {}", self.field_type)
    }
}

impl fmt::Display for PropertySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_this {
            f.write_str("instance ")?;
        }
        write!(f, "{} (", self.property_type)?;
        write_list(f, &self.params)?;
        f.write_str(")")
    }
}

impl fmt::Display for LocalVariableSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("locals (")?;
        write_list(f, &self.locals)?;
        f.write_str(")")
    }
}

impl fmt::Display for TypeSpecSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base)
    }
}

impl fmt::Display for MethodSpecSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<")?;
        write_list(f, &self.generic_args)?;
        f.write_str(">")
    }
}
