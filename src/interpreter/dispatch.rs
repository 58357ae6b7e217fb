//! Overload resolution
//!
//! A block `(head c1 ... cn)` resolves to the first visible signature, in
//! scope order, whose name matches `head` case-insensitively, whose arity
//! admits `n` arguments and whose parameter kinds accept every child. A
//! child that is itself a block is judged by what it could return: the union
//! of the return kinds of the functions that could handle it.

use std::rc::Rc;

use tracing::trace;

use super::{Interpreter, Template};
use crate::error::{Error, Result};
use crate::kind::Kind;
use crate::native::Function;
use crate::signature::Signature;
use crate::token::{Block, Token};

impl<'p> Interpreter<'p> {
    /// Functions named `name_key`, innermost scope first and newest
    /// registration first within a scope.
    fn function_candidates<'a>(
        &'a self,
        name_key: &'a str,
    ) -> impl Iterator<Item = &'a Rc<Function>> {
        self.chain().flat_map(move |scope| {
            scope
                .functions
                .iter()
                .rev()
                .filter(move |f| f.signature().name_key() == name_key)
        })
    }

    fn template_candidates<'a>(
        &'a self,
        name_key: &'a str,
    ) -> impl Iterator<Item = &'a Rc<Template>> {
        self.chain().flat_map(move |scope| {
            scope
                .templates
                .iter()
                .rev()
                .filter(move |t| t.signature().name_key() == name_key)
        })
    }

    /// Find the function a block calls.
    ///
    /// `Ok(None)` means the block is left as it is: nothing by that name, or
    /// no overload whose kinds fit. A name whose overloads all reject the
    /// argument count is an [`Error::Arity`].
    pub(crate) fn resolve(&self, block: &Block) -> Result<Option<Rc<Function>>> {
        let name_key = block.head.to_ascii_lowercase();
        let signatures = self
            .function_candidates(&name_key)
            .map(|f| (f.signature(), f));
        Ok(self
            .select(&block.head, signatures, &block.children)?
            .map(Rc::clone))
    }

    /// Find the template `(! name args...)` instantiates.
    pub(crate) fn resolve_template(&self, name: &str, args: &[Token]) -> Result<Rc<Template>> {
        let name_key = name.to_ascii_lowercase();
        let signatures = self
            .template_candidates(&name_key)
            .map(|t| (t.signature(), t));
        self.select(name, signatures, args)?
            .map(Rc::clone)
            .ok_or_else(|| Error::TemplateNotFound(name.to_string()))
    }

    fn select<'a, T>(
        &self,
        name: &str,
        candidates: impl Iterator<Item = (&'a Signature, &'a T)>,
        children: &[Token],
    ) -> Result<Option<&'a T>> {
        let mut known = false;
        let mut arity_matched = false;
        for (signature, candidate) in candidates {
            known = true;
            if !signature.accepts_arity(children.len()) {
                continue;
            }
            arity_matched = true;
            if children
                .iter()
                .enumerate()
                .all(|(i, child)| self.accepts_child(signature, i, child))
            {
                trace!(signature = %signature, "resolved");
                return Ok(Some(candidate));
            }
        }
        if known && !arity_matched {
            return Err(Error::Arity {
                name: name.to_string(),
                count: children.len(),
            });
        }
        Ok(None)
    }

    fn accepts_child(&self, signature: &Signature, index: usize, child: &Token) -> bool {
        let parameter = signature.parameter_kind(index);
        match child {
            Token::Block(_) if parameter.is_quoting() => true,
            Token::Block(block) => parameter.accepts(self.look_ahead(block)),
            atom => parameter.accepts(atom.kind()),
        }
    }

    /// What evaluating `block` could produce, looking one level down.
    pub(crate) fn look_ahead(&self, block: &Block) -> Kind {
        if block.head.is_empty() {
            return match block.children.as_slice() {
                [only] if !only.is_block() => only.kind(),
                _ => Kind::ANY,
            };
        }

        let name_key = block.head.to_ascii_lowercase();
        let mut known = false;
        let mut returns = Kind::empty();
        for function in self.function_candidates(&name_key) {
            known = true;
            if function.signature().accepts_arity(block.children.len()) {
                returns |= function.signature().return_kind();
            }
        }

        match (known, block.children.is_empty()) {
            // Left as is when evaluated
            (false, true) => Token::from_text(&block.head).kind(),
            (false, false) => Kind::TOKEN,
            // Evaluation will fail with an arity error; let it
            (true, _) if returns.is_empty() => Kind::ANY,
            (true, _) => returns,
        }
    }

    /// `true` when every evaluated argument fits the signature.
    pub(crate) fn accepts_values(&self, signature: &Signature, args: &[Token]) -> bool {
        args.iter()
            .enumerate()
            .all(|(i, arg)| signature.quotes(i) || signature.parameter_kind(i).accepts(arg.kind()))
    }

    /// Pick an overload for arguments that are already evaluated, after the
    /// look-ahead choice turned out not to fit them.
    pub(crate) fn redispatch(&self, name: &str, args: &[Token]) -> Result<Rc<Function>> {
        let name_key = name.to_ascii_lowercase();
        let mut mismatch = None;
        for function in self.function_candidates(&name_key) {
            let signature = function.signature();
            if !signature.accepts_arity(args.len()) {
                continue;
            }
            if self.accepts_values(signature, args) {
                trace!(signature = %signature, "redispatched on evaluated arguments");
                return Ok(Rc::clone(function));
            }
            if mismatch.is_none() {
                mismatch = args.iter().enumerate().find_map(|(i, arg)| {
                    let expected = signature.parameter_kind(i);
                    (!expected.accepts(arg.kind())).then(|| Error::KindMismatch {
                        context: signature.to_string(),
                        expected,
                        found: arg.kind(),
                    })
                });
            }
        }
        Err(mismatch.unwrap_or_else(|| Error::Arity {
            name: name.to_string(),
            count: args.len(),
        }))
    }
}
