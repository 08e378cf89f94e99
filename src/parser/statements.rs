//! Statement parsing implementation
//!
//! This module handles parsing of all Pascal-S statement forms:
//!
//! - Compound statements: `mulai ... selesai`
//! - Assignments: `x := e`, `a[i] := e`
//! - Control flow: `jika`, `selama`, `untuk`, `ulangi ... sampai`
//! - Procedure calls: `tulis`, `writeln(x)`
//! - Empty statements from stray or trailing semicolons
//!
//! # Grammar
//!
//! ```text
//! compound   ::= "mulai" statement_list "selesai"
//! statement_list ::= statement (";" statement)*
//! statement  ::= compound | assignment | if | while | for | repeat | call | empty
//! assignment ::= variable ":=" expression
//! if         ::= "jika" expression "maka" statement ("selain-itu" statement)?
//! while      ::= "selama" expression "lakukan" statement
//! for        ::= "untuk" identifier ":=" expression ("ke" | "turun-ke") expression
//!                "lakukan" statement
//! repeat     ::= "ulangi" statement_list "sampai" expression
//! call       ::= identifier ("(" arguments? ")")?
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::lexer::TokenKind;
use crate::parser::parse::{Parser, SyntaxError};
use crate::parser::tree::*;

impl Parser {
    /// Parse compound statement: mulai statement_list selesai
    pub(crate) fn parse_compound_statement(&mut self) -> Result<CompoundStatement, SyntaxError> {
        let begin = self.expect_keyword("mulai")?;
        let statements = if self.check_keyword("selesai") {
            StatementList::default()
        } else {
            self.parse_statement_list()?
        };
        let end = self.expect_keyword("selesai")?;

        Ok(CompoundStatement {
            begin,
            statements,
            end,
        })
    }

    /// Parse statement list: statement (; statement)*
    pub(crate) fn parse_statement_list(&mut self) -> Result<StatementList, SyntaxError> {
        let mut list = StatementList {
            statements: vec![self.parse_statement()?],
            separators: Vec::new(),
        };

        while self.check(&TokenKind::Semicolon) {
            list.separators.push(self.consume("';'")?);
            list.statements.push(self.parse_statement()?);
        }

        Ok(list)
    }

    /// Parse a statement
    pub fn parse_statement(&mut self) -> Result<Statement, SyntaxError> {
        if self.check_keyword("mulai") {
            return Ok(Statement::Compound(self.parse_compound_statement()?));
        }
        if self.check_keyword("jika") {
            return Ok(Statement::If(self.parse_if_statement()?));
        }
        if self.check_keyword("selama") {
            return Ok(Statement::While(self.parse_while_statement()?));
        }
        if self.check_keyword("untuk") {
            return Ok(Statement::For(self.parse_for_statement()?));
        }
        if self.check_keyword("ulangi") {
            return Ok(Statement::Repeat(self.parse_repeat_statement()?));
        }

        if self.check(&TokenKind::Identifier) {
            let is_assignment = self.peek_ahead(1).is_some_and(|next| {
                matches!(next.kind, TokenKind::AssignOperator | TokenKind::LBracket)
            });
            return if is_assignment {
                Ok(Statement::Assignment(self.parse_assignment_statement()?))
            } else {
                Ok(Statement::Call(self.parse_call()?))
            };
        }

        if self.is_at_end()
            || self.check(&TokenKind::Semicolon)
            || self.check_keyword("selesai")
            || self.check_keyword("sampai")
        {
            return Ok(Statement::Empty);
        }

        Err(self.error("statement"))
    }

    /// Parse assignment: variable := expression
    fn parse_assignment_statement(&mut self) -> Result<AssignmentStatement, SyntaxError> {
        let target = self.parse_variable_access()?;
        let assign = self.expect(&TokenKind::AssignOperator, "':=' in assignment")?;
        let value = self.parse_expression()?;

        Ok(AssignmentStatement {
            target,
            assign,
            value,
        })
    }

    /// Parse if statement: jika cond maka stmt (selain-itu stmt)?
    fn parse_if_statement(&mut self) -> Result<IfStatement, SyntaxError> {
        let if_keyword = self.expect_keyword("jika")?;
        let condition = self.parse_expression()?;
        let then_keyword = self.expect_keyword("maka")?;
        let then_branch = Box::new(self.parse_statement()?);

        // selain-itu binds to the nearest jika
        let else_clause = match self.match_keyword("selain-itu") {
            Some(else_keyword) => Some(ElseClause {
                else_keyword,
                body: Box::new(self.parse_statement()?),
            }),
            None => None,
        };

        Ok(IfStatement {
            if_keyword,
            condition,
            then_keyword,
            then_branch,
            else_clause,
        })
    }

    /// Parse while statement: selama cond lakukan stmt
    fn parse_while_statement(&mut self) -> Result<WhileStatement, SyntaxError> {
        let while_keyword = self.expect_keyword("selama")?;
        let condition = self.parse_expression()?;
        let do_keyword = self.expect_keyword("lakukan")?;
        let body = Box::new(self.parse_statement()?);

        Ok(WhileStatement {
            while_keyword,
            condition,
            do_keyword,
            body,
        })
    }

    /// Parse for statement: untuk v := e (ke | turun-ke) e lakukan stmt
    fn parse_for_statement(&mut self) -> Result<ForStatement, SyntaxError> {
        let for_keyword = self.expect_keyword("untuk")?;
        let variable = self.expect_identifier("after 'untuk'")?;
        let assign = self.expect(&TokenKind::AssignOperator, "':=' after loop variable")?;
        let start = self.parse_expression()?;

        let direction = match self
            .match_keyword("ke")
            .or_else(|| self.match_keyword("turun-ke"))
        {
            Some(token) => token,
            None => return Err(self.error("'ke' or 'turun-ke'")),
        };

        let end = self.parse_expression()?;
        let do_keyword = self.expect_keyword("lakukan")?;
        let body = Box::new(self.parse_statement()?);

        Ok(ForStatement {
            for_keyword,
            variable,
            assign,
            start,
            direction,
            end,
            do_keyword,
            body,
        })
    }

    /// Parse repeat statement: ulangi statement_list sampai cond
    fn parse_repeat_statement(&mut self) -> Result<RepeatStatement, SyntaxError> {
        let repeat_keyword = self.expect_keyword("ulangi")?;
        let body = self.parse_statement_list()?;
        let until_keyword = self.expect_keyword("sampai")?;
        let condition = self.parse_expression()?;

        Ok(RepeatStatement {
            repeat_keyword,
            body,
            until_keyword,
            condition,
        })
    }

    /// Parse call: identifier ( ( arguments? ) )?
    pub(crate) fn parse_call(&mut self) -> Result<Call, SyntaxError> {
        let name = self.expect_identifier("in call")?;
        let arguments = if self.check(&TokenKind::LParenthesis) {
            Some(self.parse_argument_list()?)
        } else {
            None
        };
        Ok(Call { name, arguments })
    }

    fn parse_argument_list(&mut self) -> Result<ArgumentList, SyntaxError> {
        let lparen = self.expect(&TokenKind::LParenthesis, "'(' before arguments")?;
        let mut arguments = Vec::new();
        let mut commas = Vec::new();

        if !self.check(&TokenKind::RParenthesis) {
            arguments.push(self.parse_expression()?);
            while self.check(&TokenKind::Comma) {
                commas.push(self.consume("','")?);
                arguments.push(self.parse_expression()?);
            }
        }

        let rparen = self.expect(&TokenKind::RParenthesis, "')' after arguments")?;

        Ok(ArgumentList {
            lparen,
            arguments,
            commas,
            rparen,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Dfa;

    fn statement(source: &str) -> Statement {
        let mut parser = Parser::from_source(source, &Dfa::pascal_s()).unwrap();
        let stmt = parser.parse_statement().unwrap();
        assert!(parser.is_at_end(), "unconsumed input in {:?}", source);
        stmt
    }

    fn body(source: &str) -> StatementList {
        let mut parser = Parser::from_source(source, &Dfa::pascal_s()).unwrap();
        parser.parse_compound_statement().unwrap().statements
    }

    #[test]
    fn test_parse_if_else() {
        match statement("jika 1 < 2 maka x := 1 selain-itu x := 2") {
            Statement::If(stmt) => {
                let relation = stmt.condition.relation.as_ref().unwrap();
                assert_eq!(relation.operator.text, "<");
                assert!(matches!(*stmt.then_branch, Statement::Assignment(_)));
                let else_clause = stmt.else_clause.unwrap();
                assert!(matches!(*else_clause.body, Statement::Assignment(_)));
            }
            other => panic!("Expected if statement, got {:?}", other),
        }
    }

    #[test]
    fn test_dangling_else_binds_inner() {
        match statement("jika a maka jika b maka x := 1 selain-itu x := 2") {
            Statement::If(outer) => {
                assert!(outer.else_clause.is_none());
                match *outer.then_branch {
                    Statement::If(inner) => assert!(inner.else_clause.is_some()),
                    other => panic!("Expected nested if, got {:?}", other),
                }
            }
            other => panic!("Expected if statement, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_loops() {
        match statement("untuk i := 10 turun-ke 1 lakukan tulis(i)") {
            Statement::For(stmt) => {
                assert_eq!(stmt.variable.text, "i");
                assert!(stmt.is_downward());
                assert!(matches!(*stmt.body, Statement::Call(_)));
            }
            other => panic!("Expected for statement, got {:?}", other),
        }

        assert!(matches!(
            statement("selama x > 0 lakukan x := x - 1"),
            Statement::While(_)
        ));

        match statement("ulangi x := x + 1; y := y sampai x = 10") {
            Statement::Repeat(stmt) => assert_eq!(stmt.body.len(), 2),
            other => panic!("Expected repeat statement, got {:?}", other),
        }
    }

    #[test]
    fn test_assignment_vs_call() {
        assert!(matches!(statement("x := 1"), Statement::Assignment(_)));
        match statement("a[i + 1] := 0") {
            Statement::Assignment(stmt) => assert!(stmt.target.index.is_some()),
            other => panic!("Expected assignment, got {:?}", other),
        }
        match statement("writeln('halo', x)") {
            Statement::Call(call) => {
                assert_eq!(call.name.text, "writeln");
                assert_eq!(call.arguments.unwrap().arguments.len(), 2);
            }
            other => panic!("Expected call, got {:?}", other),
        }
        match statement("bersihkan") {
            Statement::Call(call) => assert!(call.arguments.is_none()),
            other => panic!("Expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_statements_are_kept() {
        let list = body("mulai x := 1;; y := 2; selesai");
        assert_eq!(list.len(), 4);
        assert_eq!(list.separators.len(), 3);
        assert_eq!(list.statements[1], Statement::Empty);
        assert_eq!(list.statements[3], Statement::Empty);

        assert!(body("mulai selesai").is_empty());
        assert_eq!(body("mulai ; selesai").statements, vec![Statement::Empty, Statement::Empty]);
    }

    #[test]
    fn test_missing_then() {
        let mut parser = Parser::from_source("jika x x := 1", &Dfa::pascal_s()).unwrap();
        let err = parser.parse_statement().unwrap_err();
        assert_eq!(err.expected, "'maka'");
        assert_eq!(err.found, "IDENTIFIER(x)");
    }
}
