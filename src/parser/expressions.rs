//! Expression parsing implementation
//!
//! Three precedence levels plus factors, lowest first:
//!
//! ```text
//! expression        ::= simple_expression (relop simple_expression)?
//! simple_expression ::= ("+" | "-")? term (addop term)*
//! term              ::= factor (mulop factor)*
//! factor            ::= "tidak" factor
//!                     | "(" expression ")"
//!                     | number | string | char | boolean_word
//!                     | identifier "(" arguments? ")"
//!                     | identifier ("[" expression "]")?
//!
//! relop ::= "=" | "<>" | "<" | "<=" | ">" | ">="
//! addop ::= "+" | "-" | "atau"
//! mulop ::= "*" | "/" | "bagi" | "mod" | "dan"
//! ```
//!
//! Relational operators do not chain; `a < b < c` stops after `a < b`.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::lexer::classes::is_boolean_word;
use crate::lexer::{Token, TokenKind};
use crate::parser::parse::{Parser, SyntaxError};
use crate::parser::tree::*;

impl Parser {
    /// Parse expression: simple_expression (relop simple_expression)?
    pub fn parse_expression(&mut self) -> Result<Expression, SyntaxError> {
        let left = self.parse_simple_expression()?;

        let relation = if self.check(&TokenKind::RelationalOperator) {
            let operator = self.consume("relational operator")?;
            let right = self.parse_simple_expression()?;
            Some(Relation { operator, right })
        } else {
            None
        };

        Ok(Expression { left, relation })
    }

    /// Parse simple expression: sign? term (addop term)*
    pub(crate) fn parse_simple_expression(&mut self) -> Result<SimpleExpression, SyntaxError> {
        let sign = self.match_sign();
        let first = self.parse_term()?;

        let mut rest = Vec::new();
        while let Some(operator) = self.match_adding_operator() {
            rest.push((operator, self.parse_term()?));
        }

        Ok(SimpleExpression { sign, first, rest })
    }

    /// Parse term: factor (mulop factor)*
    fn parse_term(&mut self) -> Result<Term, SyntaxError> {
        let first = self.parse_factor()?;

        let mut rest = Vec::new();
        while let Some(operator) = self.match_multiplying_operator() {
            rest.push((operator, self.parse_factor()?));
        }

        Ok(Term { first, rest })
    }

    /// Parse factor
    fn parse_factor(&mut self) -> Result<Factor, SyntaxError> {
        if let Some(operator) = self.match_token(&TokenKind::LogicalOperator, "tidak") {
            let operand = Box::new(self.parse_factor()?);
            return Ok(Factor::Not { operator, operand });
        }

        if self.check(&TokenKind::LParenthesis) {
            let lparen = self.consume("'('")?;
            let inner = Box::new(self.parse_expression()?);
            let rparen = self.expect(&TokenKind::RParenthesis, "')' after expression")?;
            return Ok(Factor::Parenthesized {
                lparen,
                inner,
                rparen,
            });
        }

        let Some(token) = self.peek() else {
            return Err(self.error("expression"));
        };

        let literal_kind = match token.kind {
            TokenKind::Number if token.text.contains('.') => Some(LiteralKind::Real),
            TokenKind::Number => Some(LiteralKind::Integer),
            TokenKind::CharLiteral => Some(LiteralKind::Char),
            TokenKind::StringLiteral => Some(LiteralKind::String),
            TokenKind::Identifier if is_boolean_word(&token.text) => Some(LiteralKind::Boolean),
            TokenKind::Identifier => None,
            _ => return Err(self.error("expression")),
        };

        if let Some(kind) = literal_kind {
            let token = self.consume("literal")?;
            return Ok(Factor::Literal(Literal { token, kind }));
        }

        let is_call = self
            .peek_ahead(1)
            .is_some_and(|next| next.kind == TokenKind::LParenthesis);
        if is_call {
            Ok(Factor::Call(self.parse_call()?))
        } else {
            Ok(Factor::Variable(self.parse_variable_access()?))
        }
    }

    /// Parse variable access: identifier ([ expression ])?
    pub(crate) fn parse_variable_access(&mut self) -> Result<VariableAccess, SyntaxError> {
        let name = self.expect_identifier("in variable access")?;

        let index = if self.check(&TokenKind::LBracket) {
            let lbracket = self.consume("'['")?;
            let index = Box::new(self.parse_expression()?);
            let rbracket = self.expect(&TokenKind::RBracket, "']' after index")?;
            Some(IndexSuffix {
                lbracket,
                index,
                rbracket,
            })
        } else {
            None
        };

        Ok(VariableAccess { name, index })
    }

    fn match_adding_operator(&mut self) -> Option<Token> {
        let is_adding = self.check_token(&TokenKind::ArithmeticOperator, "+")
            || self.check_token(&TokenKind::ArithmeticOperator, "-")
            || self.check_token(&TokenKind::LogicalOperator, "atau");
        if is_adding {
            self.advance()
        } else {
            None
        }
    }

    fn match_multiplying_operator(&mut self) -> Option<Token> {
        let is_multiplying = ["*", "/", "bagi", "mod"]
            .iter()
            .any(|op| self.check_token(&TokenKind::ArithmeticOperator, op))
            || self.check_token(&TokenKind::LogicalOperator, "dan");
        if is_multiplying {
            self.advance()
        } else {
            None
        }
    }
}
