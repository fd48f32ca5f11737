//! Recursive-descent parser that builds a [`Circuit`] in a single pass.
//!
//! There is no intermediate AST: declarations allocate qubits and clbits on
//! the circuit as they are parsed, and statements append instructions
//! directly. Gate parameters are constant expressions and are folded during
//! parsing.

use std::f64::consts::PI;

use alsvid_ir::{Circuit, ClbitId, Instruction, QubitId, StandardGate};
use rustc_hash::FxHashMap;

use crate::error::{ParseError, ParseResult};
use crate::lexer::{tokenize, SpannedToken, Token};

/// Parse OpenQASM source into a circuit.
pub fn parse(source: &str) -> ParseResult<Circuit> {
    let tokens = tokenize(source).map_err(|(line, message)| ParseError::LexerError {
        line,
        message,
    })?;
    Parser::new(tokens).parse_program()
}

/// A contiguous run of qubits or clbits declared under one name.
#[derive(Debug, Clone, Copy)]
struct Register {
    offset: u32,
    size: u32,
}

struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
    qregs: FxHashMap<String, Register>,
    cregs: FxHashMap<String, Register>,
    circuit: Circuit,
}

/// Resolved operand: either one bit or a whole register to broadcast over.
#[derive(Debug, Clone)]
enum Operand {
    Single(u32),
    Register { offset: u32, size: u32 },
}

impl Operand {
    fn size(&self) -> u32 {
        match self {
            Operand::Single(_) => 1,
            Operand::Register { size, .. } => *size,
        }
    }

    fn bit(&self, i: u32) -> u32 {
        match self {
            Operand::Single(b) => *b,
            Operand::Register { offset, .. } => offset + i,
        }
    }
}

impl Parser {
    fn new(tokens: Vec<SpannedToken>) -> Self {
        Self {
            tokens,
            pos: 0,
            qregs: FxHashMap::default(),
            cregs: FxHashMap::default(),
            circuit: Circuit::new("qasm"),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(1, |t| t.line)
    }

    fn advance(&mut self) -> ParseResult<SpannedToken> {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or(ParseError::UnexpectedEof)?;
        self.pos += 1;
        Ok(token)
    }

    fn expect(&mut self, expected: Token) -> ParseResult<()> {
        let token = self.advance()?;
        if token.token == expected {
            Ok(())
        } else {
            Err(ParseError::UnexpectedToken {
                line: token.line,
                expected: expected.to_string(),
                found: token.token.to_string(),
            })
        }
    }

    fn expect_identifier(&mut self) -> ParseResult<(String, usize)> {
        let token = self.advance()?;
        match token.token {
            Token::Identifier(name) => Ok((name, token.line)),
            other => Err(ParseError::UnexpectedToken {
                line: token.line,
                expected: "identifier".into(),
                found: other.to_string(),
            }),
        }
    }

    fn expect_index(&mut self) -> ParseResult<u32> {
        self.expect(Token::LBracket)?;
        let token = self.advance()?;
        let value = match token.token {
            Token::IntLiteral(v) => v as u32,
            other => {
                return Err(ParseError::UnexpectedToken {
                    line: token.line,
                    expected: "integer".into(),
                    found: other.to_string(),
                })
            }
        };
        self.expect(Token::RBracket)?;
        Ok(value)
    }

    fn parse_program(mut self) -> ParseResult<Circuit> {
        // Version header is optional; both 2.x and 3.x are accepted.
        if self.peek() == Some(&Token::OpenQasm) {
            self.advance()?;
            let token = self.advance()?;
            let major = match token.token {
                Token::FloatLiteral(v) => v.trunc() as u64,
                Token::IntLiteral(v) => v,
                _ => return Err(ParseError::InvalidVersion),
            };
            if major != 2 && major != 3 {
                return Err(ParseError::InvalidVersion);
            }
            self.expect(Token::Semicolon)?;
        }

        while self.peek().is_some() {
            self.parse_statement()?;
        }

        Ok(self.circuit)
    }

    fn parse_statement(&mut self) -> ParseResult<()> {
        match self.peek() {
            Some(Token::Include) => self.parse_include(),
            Some(Token::Qreg) => self.parse_qreg(),
            Some(Token::Creg) => self.parse_creg(),
            Some(Token::Qubit) => self.parse_qubit_decl(),
            Some(Token::Bit) => self.parse_bit_decl(),
            Some(Token::Measure) => self.parse_measure_arrow(),
            Some(Token::Reset) => self.parse_reset(),
            Some(Token::Barrier) => self.parse_barrier(),
            Some(Token::Identifier(_)) => self.parse_identifier_statement(),
            Some(Token::Semicolon) => {
                self.advance()?;
                Ok(())
            }
            Some(other) => Err(ParseError::UnexpectedToken {
                line: self.line(),
                expected: "statement".into(),
                found: other.to_string(),
            }),
            None => Err(ParseError::UnexpectedEof),
        }
    }

    fn parse_include(&mut self) -> ParseResult<()> {
        // Standard library includes define the gates we already know; the
        // statement is accepted and ignored.
        self.advance()?;
        let token = self.advance()?;
        match token.token {
            Token::StringLiteral(_) => {}
            other => {
                return Err(ParseError::UnexpectedToken {
                    line: token.line,
                    expected: "string literal".into(),
                    found: other.to_string(),
                })
            }
        }
        self.expect(Token::Semicolon)
    }

    // `qreg name[n];`
    fn parse_qreg(&mut self) -> ParseResult<()> {
        self.advance()?;
        let (name, line) = self.expect_identifier()?;
        let size = self.expect_index()?;
        self.expect(Token::Semicolon)?;
        self.declare_qreg(name, size, line)
    }

    // `creg name[n];`
    fn parse_creg(&mut self) -> ParseResult<()> {
        self.advance()?;
        let (name, line) = self.expect_identifier()?;
        let size = self.expect_index()?;
        self.expect(Token::Semicolon)?;
        self.declare_creg(name, size, line)
    }

    // `qubit[n] name;` or `qubit name;`
    fn parse_qubit_decl(&mut self) -> ParseResult<()> {
        self.advance()?;
        let size = if self.peek() == Some(&Token::LBracket) {
            self.expect_index()?
        } else {
            1
        };
        let (name, line) = self.expect_identifier()?;
        self.expect(Token::Semicolon)?;
        self.declare_qreg(name, size, line)
    }

    // `bit[n] name;` or `bit name;`
    fn parse_bit_decl(&mut self) -> ParseResult<()> {
        self.advance()?;
        let size = if self.peek() == Some(&Token::LBracket) {
            self.expect_index()?
        } else {
            1
        };
        let (name, line) = self.expect_identifier()?;
        self.expect(Token::Semicolon)?;
        self.declare_creg(name, size, line)
    }

    fn declare_qreg(&mut self, name: String, size: u32, line: usize) -> ParseResult<()> {
        if self.qregs.contains_key(&name) || self.cregs.contains_key(&name) {
            return Err(ParseError::DuplicateDeclaration { line, name });
        }
        let offset = self.circuit.num_qubits() as u32;
        self.circuit.add_qubits(size);
        self.qregs.insert(name, Register { offset, size });
        Ok(())
    }

    fn declare_creg(&mut self, name: String, size: u32, line: usize) -> ParseResult<()> {
        if self.qregs.contains_key(&name) || self.cregs.contains_key(&name) {
            return Err(ParseError::DuplicateDeclaration { line, name });
        }
        let offset = self.circuit.num_clbits() as u32;
        self.circuit.add_clbits(size);
        self.cregs.insert(name, Register { offset, size });
        Ok(())
    }

    // `measure q -> c;` or `measure q[i] -> c[j];`
    fn parse_measure_arrow(&mut self) -> ParseResult<()> {
        self.advance()?;
        let source = self.parse_qubit_operand()?;
        self.expect(Token::Arrow)?;
        let target = self.parse_clbit_operand()?;
        self.expect(Token::Semicolon)?;
        self.emit_measure(source, target)
    }

    fn emit_measure(&mut self, source: Operand, target: Operand) -> ParseResult<()> {
        if source.size() != target.size() {
            return Err(ParseError::BroadcastMismatch {
                line: self.line(),
                left: source.size() as usize,
                right: target.size() as usize,
            });
        }
        for i in 0..source.size() {
            self.circuit
                .measure(QubitId(source.bit(i)), ClbitId(target.bit(i)))?;
        }
        Ok(())
    }

    fn parse_reset(&mut self) -> ParseResult<()> {
        self.advance()?;
        let operand = self.parse_qubit_operand()?;
        self.expect(Token::Semicolon)?;
        for i in 0..operand.size() {
            self.circuit.reset(QubitId(operand.bit(i)))?;
        }
        Ok(())
    }

    fn parse_barrier(&mut self) -> ParseResult<()> {
        self.advance()?;
        let mut qubits = Vec::new();
        if self.peek() != Some(&Token::Semicolon) {
            loop {
                let operand = self.parse_qubit_operand()?;
                for i in 0..operand.size() {
                    qubits.push(QubitId(operand.bit(i)));
                }
                if self.peek() == Some(&Token::Comma) {
                    self.advance()?;
                } else {
                    break;
                }
            }
        } else {
            // Bare `barrier;` applies to every qubit.
            for q in 0..self.circuit.num_qubits() {
                qubits.push(QubitId(q as u32));
            }
        }
        self.expect(Token::Semicolon)?;
        self.circuit.barrier(qubits)?;
        Ok(())
    }

    // Either a gate call or `c = measure q;`.
    fn parse_identifier_statement(&mut self) -> ParseResult<()> {
        let (name, line) = self.expect_identifier()?;

        if self.is_creg_assignment(&name) {
            let target = self.finish_operand(name, line, false)?;
            self.expect(Token::Eq)?;
            self.expect(Token::Measure)?;
            let source = self.parse_qubit_operand()?;
            self.expect(Token::Semicolon)?;
            return self.emit_measure(source, target);
        }

        self.parse_gate_call(name, line)
    }

    fn is_creg_assignment(&self, name: &str) -> bool {
        if !self.cregs.contains_key(name) {
            return false;
        }
        // Lookahead past an optional index for `=`.
        let mut pos = self.pos;
        if self.tokens.get(pos).map(|t| &t.token) == Some(&Token::LBracket) {
            pos += 3;
        }
        self.tokens.get(pos).map(|t| &t.token) == Some(&Token::Eq)
    }

    fn parse_gate_call(&mut self, name: String, line: usize) -> ParseResult<()> {
        let mut params = Vec::new();
        if self.peek() == Some(&Token::LParen) {
            self.advance()?;
            if self.peek() != Some(&Token::RParen) {
                loop {
                    params.push(self.parse_expression()?);
                    if self.peek() == Some(&Token::Comma) {
                        self.advance()?;
                    } else {
                        break;
                    }
                }
            }
            self.expect(Token::RParen)?;
        }

        let mut operands = Vec::new();
        loop {
            operands.push(self.parse_qubit_operand()?);
            if self.peek() == Some(&Token::Comma) {
                self.advance()?;
            } else {
                break;
            }
        }
        self.expect(Token::Semicolon)?;

        let gate = resolve_gate(&name, &params, operands.len(), line)?;

        // All register operands in one call must have equal size; singles
        // broadcast against them.
        let mut span = 1;
        for op in &operands {
            if op.size() > 1 {
                if span > 1 && op.size() != span {
                    return Err(ParseError::BroadcastMismatch {
                        line,
                        left: span as usize,
                        right: op.size() as usize,
                    });
                }
                span = op.size();
            }
        }

        for i in 0..span {
            let qubits: Vec<QubitId> = operands
                .iter()
                .map(|op| QubitId(op.bit(if op.size() > 1 { i } else { 0 })))
                .collect();
            self.circuit.push(Instruction::gate(gate, qubits))?;
        }
        Ok(())
    }

    fn parse_qubit_operand(&mut self) -> ParseResult<Operand> {
        let (name, line) = self.expect_identifier()?;
        self.finish_operand(name, line, true)
    }

    fn parse_clbit_operand(&mut self) -> ParseResult<Operand> {
        let (name, line) = self.expect_identifier()?;
        self.finish_operand(name, line, false)
    }

    fn finish_operand(&mut self, name: String, line: usize, quantum: bool) -> ParseResult<Operand> {
        let regs = if quantum { &self.qregs } else { &self.cregs };
        let reg = *regs
            .get(&name)
            .ok_or(ParseError::UndefinedIdentifier { line, name: name.clone() })?;

        if self.peek() == Some(&Token::LBracket) {
            let index = self.expect_index()?;
            if index >= reg.size {
                return Err(ParseError::IndexOutOfBounds {
                    register: name,
                    index: index as usize,
                    size: reg.size as usize,
                });
            }
            Ok(Operand::Single(reg.offset + index))
        } else {
            Ok(Operand::Register {
                offset: reg.offset,
                size: reg.size,
            })
        }
    }

    // Constant expression with the usual precedence: ^ binds tightest, then
    // * and /, then + and -. `^` is right-associative.
    fn parse_expression(&mut self) -> ParseResult<f64> {
        let mut value = self.parse_term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.advance()?;
                    value += self.parse_term()?;
                }
                Some(Token::Minus) => {
                    self.advance()?;
                    value -= self.parse_term()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn parse_term(&mut self) -> ParseResult<f64> {
        let mut value = self.parse_power()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.advance()?;
                    value *= self.parse_power()?;
                }
                Some(Token::Slash) => {
                    self.advance()?;
                    value /= self.parse_power()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn parse_power(&mut self) -> ParseResult<f64> {
        let base = self.parse_unary()?;
        if self.peek() == Some(&Token::Caret) {
            self.advance()?;
            let exponent = self.parse_power()?;
            Ok(base.powf(exponent))
        } else {
            Ok(base)
        }
    }

    fn parse_unary(&mut self) -> ParseResult<f64> {
        match self.peek() {
            Some(Token::Minus) => {
                self.advance()?;
                Ok(-self.parse_unary()?)
            }
            Some(Token::Plus) => {
                self.advance()?;
                self.parse_unary()
            }
            _ => self.parse_atom(),
        }
    }

    fn parse_atom(&mut self) -> ParseResult<f64> {
        let token = self.advance()?;
        match token.token {
            Token::Pi => Ok(PI),
            Token::FloatLiteral(v) => Ok(v),
            Token::IntLiteral(v) => Ok(v as f64),
            Token::LParen => {
                let value = self.parse_expression()?;
                self.expect(Token::RParen)?;
                Ok(value)
            }
            Token::Identifier(name) => self.parse_function_call(&name, token.line),
            other => Err(ParseError::UnexpectedToken {
                line: token.line,
                expected: "expression".into(),
                found: other.to_string(),
            }),
        }
    }

    fn parse_function_call(&mut self, name: &str, line: usize) -> ParseResult<f64> {
        self.expect(Token::LParen)?;
        let arg = self.parse_expression()?;
        self.expect(Token::RParen)?;
        match name {
            "sin" => Ok(arg.sin()),
            "cos" => Ok(arg.cos()),
            "tan" => Ok(arg.tan()),
            "exp" => Ok(arg.exp()),
            "ln" => Ok(arg.ln()),
            "sqrt" => Ok(arg.sqrt()),
            _ => Err(ParseError::Unsupported {
                line,
                message: format!("unknown function '{name}'"),
            }),
        }
    }
}

fn check_params(gate: &str, expected: usize, params: &[f64], line: usize) -> ParseResult<()> {
    if params.len() == expected {
        Ok(())
    } else {
        Err(ParseError::WrongParameterCount {
            gate: gate.to_string(),
            expected,
            got: params.len(),
            line,
        })
    }
}

fn check_qubits(gate: &str, expected: usize, got: usize, line: usize) -> ParseResult<()> {
    if got == expected {
        Ok(())
    } else {
        Err(ParseError::WrongQubitCount {
            gate: gate.to_string(),
            expected,
            got,
            line,
        })
    }
}

fn resolve_gate(
    name: &str,
    params: &[f64],
    operands: usize,
    line: usize,
) -> ParseResult<StandardGate> {
    let (gate, qubits) = match name {
        "id" => (StandardGate::I, 1),
        "x" => (StandardGate::X, 1),
        "y" => (StandardGate::Y, 1),
        "z" => (StandardGate::Z, 1),
        "h" => (StandardGate::H, 1),
        "s" => (StandardGate::S, 1),
        "sdg" => (StandardGate::Sdg, 1),
        "t" => (StandardGate::T, 1),
        "tdg" => (StandardGate::Tdg, 1),
        "sx" => (StandardGate::SX, 1),
        "sxdg" => (StandardGate::SXdg, 1),
        "rx" => {
            check_params(name, 1, params, line)?;
            (StandardGate::Rx(params[0]), 1)
        }
        "ry" => {
            check_params(name, 1, params, line)?;
            (StandardGate::Ry(params[0]), 1)
        }
        "rz" => {
            check_params(name, 1, params, line)?;
            (StandardGate::Rz(params[0]), 1)
        }
        "p" | "u1" | "phase" => {
            check_params(name, 1, params, line)?;
            (StandardGate::P(params[0]), 1)
        }
        "u" | "u3" => {
            check_params(name, 3, params, line)?;
            (StandardGate::U(params[0], params[1], params[2]), 1)
        }
        "cx" | "cnot" => (StandardGate::CX, 2),
        "cy" => (StandardGate::CY, 2),
        "cz" => (StandardGate::CZ, 2),
        "ch" => (StandardGate::CH, 2),
        "swap" => (StandardGate::Swap, 2),
        "iswap" => (StandardGate::ISwap, 2),
        "crx" => {
            check_params(name, 1, params, line)?;
            (StandardGate::CRx(params[0]), 2)
        }
        "cry" => {
            check_params(name, 1, params, line)?;
            (StandardGate::CRy(params[0]), 2)
        }
        "crz" => {
            check_params(name, 1, params, line)?;
            (StandardGate::CRz(params[0]), 2)
        }
        "cp" | "cu1" => {
            check_params(name, 1, params, line)?;
            (StandardGate::CP(params[0]), 2)
        }
        "rxx" => {
            check_params(name, 1, params, line)?;
            (StandardGate::RXX(params[0]), 2)
        }
        "ryy" => {
            check_params(name, 1, params, line)?;
            (StandardGate::RYY(params[0]), 2)
        }
        "rzz" => {
            check_params(name, 1, params, line)?;
            (StandardGate::RZZ(params[0]), 2)
        }
        "ccx" | "toffoli" => (StandardGate::CCX, 3),
        "cswap" => (StandardGate::CSwap, 3),
        _ => {
            return Err(ParseError::UnknownGate {
                line,
                name: name.to_string(),
            })
        }
    };

    if gate.parameters().is_empty() {
        check_params(name, 0, params, line)?;
    }
    check_qubits(name, qubits, operands, line)?;
    Ok(gate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alsvid_ir::InstructionKind;

    #[test]
    fn test_parse_bell_qasm2() {
        let source = r#"
            OPENQASM 2.0;
            include "qelib1.inc";
            qreg q[2];
            creg c[2];
            h q[0];
            cx q[0], q[1];
            measure q -> c;
        "#;
        let circuit = parse(source).unwrap();
        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(circuit.num_clbits(), 2);
        // h, cx, and the broadcast measure expands to two instructions.
        assert_eq!(circuit.len(), 4);
    }

    #[test]
    fn test_parse_qasm3_style() {
        let source = r#"
            OPENQASM 3.0;
            qubit[2] q;
            bit[2] c;
            h q[0];
            cx q[0], q[1];
            c = measure q;
        "#;
        let circuit = parse(source).unwrap();
        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(circuit.len(), 4);
    }

    #[test]
    fn test_parameterized_gates() {
        let circuit = parse("qreg q[1]; rx(pi/2) q[0]; u(pi, 0, pi) q[0];").unwrap();
        let inst = &circuit.instructions()[0];
        match inst.kind {
            InstructionKind::Gate(StandardGate::Rx(theta)) => {
                assert!((theta - PI / 2.0).abs() < 1e-12);
            }
            ref other => panic!("unexpected instruction: {other:?}"),
        }
    }

    #[test]
    fn test_expression_precedence() {
        let circuit = parse("qreg q[1]; rx(pi/2 + pi/2) q[0]; rz(-pi) q[0]; ry(2*pi/4) q[0];")
            .unwrap();
        let theta = |i: usize| match circuit.instructions()[i].kind {
            InstructionKind::Gate(g) => g.parameters()[0],
            ref other => panic!("unexpected instruction: {other:?}"),
        };
        assert!((theta(0) - PI).abs() < 1e-12);
        assert!((theta(1) + PI).abs() < 1e-12);
        assert!((theta(2) - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_gate_broadcast() {
        let circuit = parse("qreg q[3]; h q;").unwrap();
        assert_eq!(circuit.len(), 3);
    }

    #[test]
    fn test_two_qubit_broadcast() {
        let circuit = parse("qreg a[2]; qreg b[2]; cx a, b;").unwrap();
        assert_eq!(circuit.len(), 2);
        assert_eq!(
            circuit.instructions()[1].qubits,
            vec![QubitId(1), QubitId(3)]
        );
    }

    #[test]
    fn test_broadcast_mismatch() {
        let err = parse("qreg a[2]; qreg b[3]; cx a, b;").unwrap_err();
        assert!(matches!(err, ParseError::BroadcastMismatch { .. }));
    }

    #[test]
    fn test_reset_and_barrier() {
        let circuit = parse("qreg q[2]; reset q[0]; barrier q[0], q[1]; barrier;").unwrap();
        assert_eq!(circuit.len(), 3);
        assert!(circuit.instructions()[0].is_reset());
        assert!(circuit.instructions()[1].is_barrier());
    }

    #[test]
    fn test_unknown_gate() {
        let err = parse("qreg q[1]; frobnicate q[0];").unwrap_err();
        assert!(matches!(err, ParseError::UnknownGate { .. }));
    }

    #[test]
    fn test_undefined_register() {
        let err = parse("qreg q[1]; h r[0];").unwrap_err();
        assert!(matches!(err, ParseError::UndefinedIdentifier { .. }));
    }

    #[test]
    fn test_duplicate_declaration() {
        let err = parse("qreg q[1]; creg q[1];").unwrap_err();
        assert!(matches!(err, ParseError::DuplicateDeclaration { .. }));
    }

    #[test]
    fn test_index_out_of_bounds() {
        let err = parse("qreg q[2]; h q[5];").unwrap_err();
        assert!(matches!(err, ParseError::IndexOutOfBounds { .. }));
    }

    #[test]
    fn test_wrong_parameter_count() {
        let err = parse("qreg q[1]; rx q[0];").unwrap_err();
        assert!(matches!(err, ParseError::WrongParameterCount { .. }));
    }

    #[test]
    fn test_wrong_qubit_count() {
        let err = parse("qreg q[2]; cx q[0];").unwrap_err();
        assert!(matches!(err, ParseError::WrongQubitCount { .. }));
    }

    #[test]
    fn test_bad_version() {
        let err = parse("OPENQASM 4.0;").unwrap_err();
        assert!(matches!(err, ParseError::InvalidVersion));
    }

    #[test]
    fn test_measure_single_bits() {
        let circuit = parse("qreg q[2]; creg c[2]; measure q[1] -> c[0];").unwrap();
        let inst = &circuit.instructions()[0];
        assert!(inst.is_measure());
        assert_eq!(inst.qubits, vec![QubitId(1)]);
        assert_eq!(inst.clbits, vec![ClbitId(0)]);
    }
}
