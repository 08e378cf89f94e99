//! Declaration parsing implementation
//!
//! This module handles the program header and everything before a block's
//! `mulai`:
//!
//! - Constants: `konstanta N = 10;`
//! - Types: aliases, arrays and subranges
//! - Variables: `variabel a, b: integer;`
//! - Procedures and functions with their own nested blocks
//!
//! # Grammar
//!
//! ```text
//! program      ::= "program" identifier ";" block "."
//! block        ::= declarations compound_statement
//! declarations ::= const_section* type_section* var_section* subprogram*
//! const_section ::= "konstanta" (identifier "=" const_value ";")+
//! const_value  ::= ("+" | "-")? (number | string | char | identifier)
//! type_section ::= "tipe" (identifier "=" type ";")+
//! var_section  ::= "variabel" (identifier_list ":" type ";")+
//! type         ::= simple_type | identifier | array_type | range
//! array_type   ::= "larik" "[" range "]" "dari" type
//! range        ::= simple_expression ".." simple_expression
//! subprogram   ::= "prosedur" identifier params? ";" block ";"
//!                | "fungsi" identifier params? ":" type ";" block ";"
//! params       ::= "(" group (";" group)* ")"
//! group        ::= "variabel"? identifier_list ":" type
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::lexer::{Token, TokenKind};
use crate::parser::parse::{Parser, SyntaxError};
use crate::parser::tree::*;

const SIMPLE_TYPES: [&str; 4] = ["integer", "real", "boolean", "char"];

impl Parser {
    /// Parse program header: program name ;
    pub(crate) fn parse_program_header(&mut self) -> Result<ProgramHeader, SyntaxError> {
        let program_keyword = self.expect_keyword("program")?;
        let name = self.expect_identifier("after 'program'")?;
        let semicolon = self.expect_semicolon("after program name")?;

        Ok(ProgramHeader {
            program_keyword,
            name,
            semicolon,
        })
    }

    /// Parse block: declarations followed by a compound statement
    pub(crate) fn parse_block(&mut self) -> Result<Block, SyntaxError> {
        let declarations = self.parse_declaration_part()?;
        let body = self.parse_compound_statement()?;
        Ok(Block { declarations, body })
    }

    /// Parse declaration part in const, type, var, subprogram order
    pub(crate) fn parse_declaration_part(&mut self) -> Result<DeclarationPart, SyntaxError> {
        let mut part = DeclarationPart::default();

        while self.check_keyword("konstanta") {
            part.constants.push(self.parse_const_section()?);
        }
        while self.check_keyword("tipe") {
            part.types.push(self.parse_type_section()?);
        }
        while self.check_keyword("variabel") {
            part.variables.push(self.parse_var_section()?);
        }
        while self.check_keyword("prosedur") || self.check_keyword("fungsi") {
            part.subprograms.push(self.parse_subprogram()?);
        }

        Ok(part)
    }

    /// Parse constant section: konstanta (name = value ;)+
    fn parse_const_section(&mut self) -> Result<ConstSection, SyntaxError> {
        let keyword = self.expect_keyword("konstanta")?;
        let mut declarations = vec![self.parse_const_declaration()?];
        while self.check(&TokenKind::Identifier) {
            declarations.push(self.parse_const_declaration()?);
        }
        Ok(ConstSection {
            keyword,
            declarations,
        })
    }

    fn parse_const_declaration(&mut self) -> Result<ConstDeclaration, SyntaxError> {
        let name = self.expect_identifier("in constant declaration")?;
        let equals = self.expect_equals("after constant name")?;
        let value = self.parse_const_value()?;
        let semicolon = self.expect_semicolon("after constant declaration")?;

        Ok(ConstDeclaration {
            name,
            equals,
            value,
            semicolon,
        })
    }

    /// Parse constant value: sign? (number | string | char | identifier)
    fn parse_const_value(&mut self) -> Result<ConstValue, SyntaxError> {
        let sign = self.match_sign();
        let is_value = matches!(
            self.peek().map(|t| &t.kind),
            Some(
                TokenKind::Number
                    | TokenKind::StringLiteral
                    | TokenKind::CharLiteral
                    | TokenKind::Identifier
            )
        );
        if !is_value {
            return Err(self.error("constant value"));
        }
        let value = self.consume("constant value")?;
        Ok(ConstValue { sign, value })
    }

    /// Parse type section: tipe (name = type ;)+
    fn parse_type_section(&mut self) -> Result<TypeSection, SyntaxError> {
        let keyword = self.expect_keyword("tipe")?;
        let mut declarations = vec![self.parse_type_declaration()?];
        while self.check(&TokenKind::Identifier) {
            declarations.push(self.parse_type_declaration()?);
        }
        Ok(TypeSection {
            keyword,
            declarations,
        })
    }

    fn parse_type_declaration(&mut self) -> Result<TypeDeclaration, SyntaxError> {
        let name = self.expect_identifier("in type declaration")?;
        let equals = self.expect_equals("after type name")?;
        let type_ref = self.parse_type()?;
        let semicolon = self.expect_semicolon("after type declaration")?;

        Ok(TypeDeclaration {
            name,
            equals,
            type_ref,
            semicolon,
        })
    }

    /// Parse variable section: variabel (identifier_list : type ;)+
    fn parse_var_section(&mut self) -> Result<VarSection, SyntaxError> {
        let keyword = self.expect_keyword("variabel")?;
        let mut declarations = vec![self.parse_variable_declaration()?];
        while self.check(&TokenKind::Identifier) {
            declarations.push(self.parse_variable_declaration()?);
        }
        Ok(VarSection {
            keyword,
            declarations,
        })
    }

    fn parse_variable_declaration(&mut self) -> Result<VariableDeclaration, SyntaxError> {
        let names = self.parse_identifier_list()?;
        let colon = self.expect(&TokenKind::Colon, "':' after identifier list")?;
        let type_ref = self.parse_type()?;
        let semicolon = self.expect_semicolon("after variable declaration")?;

        Ok(VariableDeclaration {
            names,
            colon,
            type_ref,
            semicolon,
        })
    }

    /// Parse identifier list: identifier (, identifier)*
    pub(crate) fn parse_identifier_list(&mut self) -> Result<IdentifierList, SyntaxError> {
        let mut identifiers = vec![self.expect_identifier("in identifier list")?];
        let mut commas = Vec::new();

        while self.check(&TokenKind::Comma) {
            commas.push(self.consume("','")?);
            identifiers.push(self.expect_identifier("after ','")?);
        }

        Ok(IdentifierList {
            identifiers,
            commas,
        })
    }

    /// Parse type reference
    ///
    /// `larik` starts an array, a type keyword is a simple type, an
    /// identifier followed by `..` or an operator starts a range, and any
    /// other identifier names a declared type.
    pub(crate) fn parse_type(&mut self) -> Result<TypeRef, SyntaxError> {
        if self.check_keyword("larik") {
            return Ok(TypeRef::Array(Box::new(self.parse_array_type()?)));
        }

        if SIMPLE_TYPES.iter().any(|word| self.check_keyword(word)) {
            return Ok(TypeRef::Simple(self.consume("type name")?));
        }

        if self.check(&TokenKind::Identifier) {
            let starts_range = self.peek_ahead(1).is_some_and(|next| {
                matches!(
                    next.kind,
                    TokenKind::RangeOperator | TokenKind::ArithmeticOperator
                )
            });
            if !starts_range {
                return Ok(TypeRef::Named(self.consume("type name")?));
            }
        }

        let starts_range = matches!(
            self.peek().map(|t| &t.kind),
            Some(TokenKind::Identifier | TokenKind::Number | TokenKind::CharLiteral)
        ) || self.check_token(&TokenKind::ArithmeticOperator, "+")
            || self.check_token(&TokenKind::ArithmeticOperator, "-");

        if starts_range {
            Ok(TypeRef::Range(self.parse_range()?))
        } else {
            Err(self.error("type"))
        }
    }

    /// Parse array type: larik [ range ] dari type
    fn parse_array_type(&mut self) -> Result<ArrayType, SyntaxError> {
        let keyword = self.expect_keyword("larik")?;
        let lbracket = self.expect(&TokenKind::LBracket, "'[' after 'larik'")?;
        let index = self.parse_range()?;
        let rbracket = self.expect(&TokenKind::RBracket, "']' after array bounds")?;
        let of_keyword = self.expect_keyword("dari")?;
        let element = self.parse_type()?;

        Ok(ArrayType {
            keyword,
            lbracket,
            index,
            rbracket,
            of_keyword,
            element,
        })
    }

    /// Parse range: simple_expression .. simple_expression
    fn parse_range(&mut self) -> Result<Range, SyntaxError> {
        let low = self.parse_simple_expression()?;
        let range_operator = self.expect(&TokenKind::RangeOperator, "'..' in range")?;
        let high = self.parse_simple_expression()?;

        Ok(Range {
            low,
            range_operator,
            high,
        })
    }

    /// Parse procedure or function declaration
    fn parse_subprogram(&mut self) -> Result<Subprogram, SyntaxError> {
        if let Some(keyword) = self.match_keyword("prosedur") {
            let name = self.expect_identifier("after 'prosedur'")?;
            let parameters = self.parse_optional_parameters()?;
            let semicolon = self.expect_semicolon("after procedure heading")?;
            let block = self.parse_block()?;
            let end_semicolon = self.expect_semicolon("after procedure body")?;

            return Ok(Subprogram::Procedure(ProcedureDeclaration {
                keyword,
                name,
                parameters,
                semicolon,
                block,
                end_semicolon,
            }));
        }

        let keyword = self.expect_keyword("fungsi")?;
        let name = self.expect_identifier("after 'fungsi'")?;
        let parameters = self.parse_optional_parameters()?;
        let colon = self.expect(&TokenKind::Colon, "':' before function result type")?;
        let return_type = self.parse_type()?;
        let semicolon = self.expect_semicolon("after function heading")?;
        let block = self.parse_block()?;
        let end_semicolon = self.expect_semicolon("after function body")?;

        Ok(Subprogram::Function(FunctionDeclaration {
            keyword,
            name,
            parameters,
            colon,
            return_type,
            semicolon,
            block,
            end_semicolon,
        }))
    }

    fn parse_optional_parameters(&mut self) -> Result<Option<FormalParameterList>, SyntaxError> {
        if self.check(&TokenKind::LParenthesis) {
            Ok(Some(self.parse_formal_parameter_list()?))
        } else {
            Ok(None)
        }
    }

    /// Parse formal parameters: ( group (; group)* )
    fn parse_formal_parameter_list(&mut self) -> Result<FormalParameterList, SyntaxError> {
        let lparen = self.expect(&TokenKind::LParenthesis, "'(' before parameters")?;
        let mut groups = vec![self.parse_parameter_group()?];
        let mut separators = Vec::new();

        while self.check(&TokenKind::Semicolon) {
            separators.push(self.consume("';'")?);
            groups.push(self.parse_parameter_group()?);
        }

        let rparen = self.expect(&TokenKind::RParenthesis, "')' after parameters")?;

        Ok(FormalParameterList {
            lparen,
            groups,
            separators,
            rparen,
        })
    }

    fn parse_parameter_group(&mut self) -> Result<ParameterGroup, SyntaxError> {
        let var_keyword = self.match_keyword("variabel");
        let names = self.parse_identifier_list()?;
        let colon = self.expect(&TokenKind::Colon, "':' after parameter names")?;
        let type_ref = self.parse_type()?;

        Ok(ParameterGroup {
            var_keyword,
            names,
            colon,
            type_ref,
        })
    }

    fn expect_equals(&mut self, ctx: &str) -> Result<Token, SyntaxError> {
        match self.match_token(&TokenKind::RelationalOperator, "=") {
            Some(token) => Ok(token),
            None => Err(self.error(format!("'=' {ctx}"))),
        }
    }

    pub(crate) fn match_sign(&mut self) -> Option<Token> {
        self.match_token(&TokenKind::ArithmeticOperator, "+")
            .or_else(|| self.match_token(&TokenKind::ArithmeticOperator, "-"))
    }
}
