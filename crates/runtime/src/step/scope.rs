//! Parameter vector of a scope, optionally bound to a reference.

use std::sync::Arc;

use pattern_core::{ExprContext, ExpressionError, Reference};

use crate::step::{Params, no_params};

/// A plain scope adopts its caller's vector as is. A scope entered through a
/// reference derives its own vector by evaluating the reference's arguments
/// against the caller's, once per activation.
#[derive(Clone, Debug)]
pub(crate) struct ParamScope {
    binding: Option<Binding>,
    params: Params,
}

#[derive(Clone, Debug)]
struct Binding {
    reference: Arc<Reference>,
    caller: Params,
    resolved: bool,
}

impl ParamScope {
    pub(crate) fn plain(params: Params) -> Self {
        Self {
            binding: None,
            params,
        }
    }

    pub(crate) fn bound(reference: Arc<Reference>, caller: Params) -> Self {
        Self {
            binding: Some(Binding {
                reference,
                caller,
                resolved: false,
            }),
            params: no_params(),
        }
    }

    pub(crate) fn params(&self) -> &Params {
        &self.params
    }

    /// Adopts a new caller vector. Returns the vector children should see now,
    /// or `None` when it has to be derived at the next activation.
    pub(crate) fn update(&mut self, caller: &Params) -> Option<Params> {
        match &mut self.binding {
            None => {
                self.params = caller.clone();
                Some(caller.clone())
            }
            Some(binding) => {
                binding.caller = caller.clone();
                binding.resolved = false;
                None
            }
        }
    }

    /// Forces re-derivation at the next activation.
    pub(crate) fn invalidate(&mut self) {
        if let Some(binding) = &mut self.binding {
            binding.resolved = false;
        }
    }

    /// Evaluates the reference arguments if they are stale. Returns the new
    /// vector when one was derived.
    pub(crate) fn resolve<C: ExprContext + ?Sized>(
        &mut self,
        ctx: &mut C,
    ) -> Result<Option<Params>, ExpressionError> {
        let Some(binding) = &mut self.binding else {
            return Ok(None);
        };
        if binding.resolved {
            return Ok(None);
        }
        let values = binding
            .reference
            .args
            .iter()
            .map(|arg| arg.evaluate(&binding.caller, ctx))
            .collect::<Result<Vec<f32>, _>>()?;
        binding.resolved = true;
        self.params = Params::from(values);
        Ok(Some(self.params.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pattern_core::{Expression, FixedContext};

    fn reference() -> Arc<Reference> {
        Arc::new(Reference::new(
            "child",
            vec![
                Expression::parse("$1 + $2").unwrap(),
                Expression::parse("$1 * 10").unwrap(),
            ],
        ))
    }

    #[test]
    fn bound_scope_derives_from_arguments() {
        let mut scope = ParamScope::bound(reference(), Params::from(vec![2.0, 3.0]));
        let mut ctx = FixedContext::default();
        let derived = scope.resolve(&mut ctx).unwrap().unwrap();
        assert_eq!(&*derived, &[5.0, 20.0]);
        assert_eq!(scope.resolve(&mut ctx).unwrap(), None);
    }

    #[test]
    fn update_rederives_against_new_caller() {
        let mut scope = ParamScope::bound(reference(), Params::from(vec![2.0, 3.0]));
        let mut ctx = FixedContext::default();
        scope.resolve(&mut ctx).unwrap();
        assert_eq!(scope.update(&Params::from(vec![1.0, 1.0])), None);
        let derived = scope.resolve(&mut ctx).unwrap().unwrap();
        assert_eq!(&*derived, &[2.0, 10.0]);
    }

    #[test]
    fn plain_scope_passes_caller_through() {
        let mut scope = ParamScope::plain(no_params());
        let caller = Params::from(vec![4.0]);
        assert_eq!(scope.update(&caller), Some(caller.clone()));
        assert_eq!(scope.params(), &caller);
        assert_eq!(scope.resolve(&mut FixedContext::default()).unwrap(), None);
    }
}
