use crate::ast::{CallNode, Expression, Literal, Property};
use crate::graph::registry::RelationSink;

use super::{ScanError, Scanner, ShapeFamily};

impl<S: RelationSink + ?Sized> Scanner<'_, S> {
    pub(super) fn visit_opt_expression(
        &mut self,
        exp: Option<&Expression>,
    ) -> Result<(), ScanError> {
        match exp {
            Some(e) => self.visit_expression(e),
            None => Ok(()),
        }
    }

    pub(super) fn visit_expression(&mut self, exp: &Expression) -> Result<(), ScanError> {
        self.enter()?;
        let result = self.dispatch_expression(exp);
        self.leave();
        result
    }

    fn dispatch_expression(&mut self, exp: &Expression) -> Result<(), ScanError> {
        match exp {
            Expression::Object(props) => {
                for prop in props {
                    self.visit_property(prop)?;
                }
                Ok(())
            }
            Expression::Ident(ident) => {
                self.visit_ident(ident);
                Ok(())
            }
            Expression::Call(call) => self.visit_call(call),
            Expression::Access { base, property } => {
                self.visit_expression(base)?;
                self.visit_ident(property);
                Ok(())
            }
            Expression::Literal(lit) => self.visit_literal(lit),
            Expression::Function(func) => self.visit_function(func),
            Expression::Binary { lhs, rhs, .. } => {
                self.visit_expression(rhs)?;
                self.visit_expression(lhs)
            }
            Expression::Unary { operand, .. } => self.visit_expression(operand),
            Expression::Index { base, index } => {
                self.visit_expression(base)?;
                self.visit_expression(index)
            }
            Expression::Ternary {
                test,
                consequent,
                alternate,
            } => {
                self.visit_expression(test)?;
                self.visit_expression(consequent)?;
                self.visit_expression(alternate)
            }
            Expression::Unsupported { kind } => Err(ScanError::UnsupportedShape {
                family: ShapeFamily::Expression,
                kind: kind.clone(),
            }),
        }
    }

    // { key: value }
    fn visit_property(&mut self, prop: &Property) -> Result<(), ScanError> {
        self.visit_expression(&prop.key)?;
        self.visit_expression(&prop.value)
    }

    // myFunc(arg1, arg2);
    fn visit_call(&mut self, call: &CallNode) -> Result<(), ScanError> {
        if let Expression::Ident(callee) = call.callee.strip_parens() {
            self.invoke(&callee.name);
            self.match_requirement(&callee.name, &call.args);
        }
        self.visit_expression(&call.callee)?;
        for arg in &call.args {
            self.visit_expression(arg)?;
        }
        Ok(())
    }

    fn visit_literal(&mut self, lit: &Literal) -> Result<(), ScanError> {
        match lit {
            Literal::Null | Literal::String(_) | Literal::Number(_) | Literal::Boolean(_) => Ok(()),
            Literal::Expression(inner) => self.visit_expression(inner),
            Literal::Array(elements) => {
                for el in elements {
                    self.visit_expression(el)?;
                }
                Ok(())
            }
            // Pattern and flags are read but carry no relation.
            Literal::Regex { .. } => Ok(()),
        }
    }
}
