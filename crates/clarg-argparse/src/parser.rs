//! The argv parser: declarations in, validated values out.
//!
//! ```
//! use clarg_argparse::{Outcome, Parser, Value};
//!
//! let mut cmd = Parser::new("copy");
//! cmd.arguments("<from> <to>").unwrap();
//! cmd.add_option("-f|--force", "Overwrite").unwrap();
//!
//! let outcome = cmd.parse(&["copy", "a.txt", "b.txt", "-f"]).unwrap();
//! assert_eq!(outcome, Outcome::Parsed);
//! assert_eq!(cmd.get("from"), Some(&Value::from("a.txt")));
//! assert_eq!(cmd.get("force"), Some(&Value::Bool(true)));
//! ```
//!
//! Non-boolean options take the next plain token as their value, so
//! `-f a.txt` would store `a.txt` under `force`.

use std::collections::VecDeque;
use std::fmt;

use crate::case::camel_case;
use crate::error::{ParseError, RegistrationError};
use crate::help::{DefaultHelp, HelpContext, HelpRenderer};
use crate::io::{ExitHook, ProcessExit, StdoutWriter, Writer};
use crate::messages::{DefaultMessages, Messages};
use crate::normalize::normalize;
use crate::parameter::{ArgumentDef, OptionDef, Parameter};
use crate::token::{Side, Token, TokenKind, TokenValue};
use crate::tokenizer::{TokenizeError, Tokenizer};
use crate::value::{Value, Values};

const VERBOSITY: &str = "verbosity";

/// Returned by option event callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emit {
    /// Normalize and store the value as usual.
    Continue,
    /// Skip storing; the next token is not consumed as a value.
    Decline,
}

/// Result of a successful [`Parser::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Parsed,
    /// Help was printed (explicitly or as the unknown-option fallback).
    Help,
    Version,
}

type EventFn = Box<dyn FnMut(&Value) -> Emit>;

enum Handler {
    Help,
    Version,
    Verbosity,
    Custom(EventFn),
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum HandlerKind {
    Help,
    Version,
    Verbosity,
    Custom,
}

impl Handler {
    fn kind(&self) -> HandlerKind {
        match self {
            Self::Help => HandlerKind::Help,
            Self::Version => HandlerKind::Version,
            Self::Verbosity => HandlerKind::Verbosity,
            Self::Custom(_) => HandlerKind::Custom,
        }
    }
}

struct RegisteredOption {
    def: OptionDef,
    handler: Option<Handler>,
    builtin: bool,
}

/// How far the cursor moves after an option.
enum Advance {
    One,
    Two,
    Stop(Outcome),
}

#[derive(Default)]
struct ParseState {
    // Indexes into `Parser::arguments` still waiting for a value.
    pending: VecDeque<usize>,
    // Front of `pending` is variadic and already has values.
    argument_open: bool,
    // Attribute name of the variadic option collecting bare values.
    last_variadic: Option<String>,
}

/// Handle to a just-registered option, used to attach an event callback.
pub struct OptionHandle<'a> {
    parser: &'a mut Parser,
    index: usize,
}

impl<'a> OptionHandle<'a> {
    pub fn def(&self) -> &OptionDef {
        &self.parser.options[self.index].def
    }

    /// Run `f` with the raw value whenever the option is seen, before the
    /// value is stored. Returning [`Emit::Decline`] skips storing it.
    pub fn on_event(self, f: impl FnMut(&Value) -> Emit + 'static) -> &'a mut Parser {
        self.parser.options[self.index].handler = Some(Handler::Custom(Box::new(f)));
        self.parser
    }

    pub fn done(self) -> &'a mut Parser {
        self.parser
    }
}

/// Declared parameters plus the values parsed for them.
pub struct Parser {
    name: String,
    version: Option<String>,
    description: String,
    options: Vec<RegisteredOption>,
    arguments: Vec<ArgumentDef>,
    values: Values,
    verbosity: i64,
    allow_unknown: bool,
    writer: Box<dyn Writer>,
    exit: Box<dyn ExitHook>,
    help: Box<dyn HelpRenderer>,
    messages: Box<dyn Messages>,
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("options", &self.registered_options().collect::<Vec<_>>())
            .field("arguments", &self.arguments)
            .field("allow_unknown", &self.allow_unknown)
            .field("values", &self.values)
            .finish()
    }
}

impl Parser {
    /// New parser with the built-in `-h|--help`, `-V|--version` and
    /// `-v|--verbosity` options.
    pub fn new(name: impl Into<String>) -> Self {
        let mut parser = Self {
            name: name.into(),
            version: None,
            description: String::new(),
            options: Vec::new(),
            arguments: Vec::new(),
            values: Values::default(),
            verbosity: 0,
            allow_unknown: false,
            writer: Box::new(StdoutWriter),
            exit: Box::new(ProcessExit),
            help: Box::new(DefaultHelp),
            messages: Box::new(DefaultMessages),
        };

        let builtins = [
            ("-h|--help", "Show help", Handler::Help),
            ("-V|--version", "Show version", Handler::Version),
            ("-v|--verbosity", "Increase verbosity", Handler::Verbosity),
        ];
        for (spec, desc, handler) in builtins {
            let def = OptionDef::new(spec).with_description(desc);
            parser.values.set_default(def.attribute_name(), Value::Null);
            parser.options.push(RegisteredOption {
                def,
                handler: Some(handler),
                builtin: true,
            });
        }
        parser.values.set_default(VERBOSITY, Value::Int(0));
        parser
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Store unregistered options instead of failing.
    pub fn allow_unknown(mut self, allow: bool) -> Self {
        self.allow_unknown = allow;
        self
    }

    pub fn with_writer(mut self, writer: impl Writer + 'static) -> Self {
        self.writer = Box::new(writer);
        self
    }

    pub fn with_exit_hook(mut self, exit: impl ExitHook + 'static) -> Self {
        self.exit = Box::new(exit);
        self
    }

    pub fn with_help_renderer(mut self, help: impl HelpRenderer + 'static) -> Self {
        self.help = Box::new(help);
        self
    }

    pub fn with_messages(mut self, messages: impl Messages + 'static) -> Self {
        self.messages = Box::new(messages);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

// Registration.
impl Parser {
    pub fn add_argument(
        &mut self,
        spec: &str,
        description: &str,
    ) -> Result<&mut Self, RegistrationError> {
        self.register_argument(ArgumentDef::new(spec).with_description(description))
    }

    pub fn register_argument(&mut self, arg: ArgumentDef) -> Result<&mut Self, RegistrationError> {
        self.check_unique(&arg, |_| false)?;
        self.values
            .set_default(arg.attribute_name(), arg.default_value());
        self.arguments.push(arg);
        Ok(self)
    }

    /// Declare several arguments at once, e.g. `"<from> [to] [extra...]"`.
    ///
    /// Nothing is registered if the batch is invalid.
    pub fn arguments(&mut self, specs: &str) -> Result<&mut Self, RegistrationError> {
        self.register_arguments(specs.split_whitespace().map(ArgumentDef::new).collect())
    }

    /// Register a batch of arguments. Only the last one may be variadic.
    pub fn register_arguments(
        &mut self,
        defs: Vec<ArgumentDef>,
    ) -> Result<&mut Self, RegistrationError> {
        let variadic: Vec<&ArgumentDef> = defs.iter().filter(|d| d.variadic()).collect();
        if variadic.len() > 1 {
            let last = defs.last().map(|d| d.name());
            if let Some(offender) = variadic.iter().find(|d| Some(d.name()) != last) {
                let name = offender.name().to_string();
                return Err(RegistrationError::VariadicNotLast {
                    message: self.messages.variadic_not_last(&name),
                    name,
                });
            }
        }

        for (i, def) in defs.iter().enumerate() {
            self.check_unique(def, |_| false)?;
            if defs[..i]
                .iter()
                .any(|d| d.attribute_name() == def.attribute_name())
            {
                let name = def.attribute_name().to_string();
                return Err(RegistrationError::DuplicateParameter {
                    message: self.messages.duplicate_parameter(def.label(), &name),
                    name,
                });
            }
        }
        for def in defs {
            self.register_argument(def)?;
        }
        Ok(self)
    }

    pub fn add_option(
        &mut self,
        spec: &str,
        description: &str,
    ) -> Result<OptionHandle<'_>, RegistrationError> {
        self.register_option(OptionDef::new(spec).with_description(description))
    }

    /// Register an option. A user option sharing a flag with a built-in one
    /// replaces the built-in. Nothing changes if registration fails.
    pub fn register_option(
        &mut self,
        opt: OptionDef,
    ) -> Result<OptionHandle<'_>, RegistrationError> {
        let shadows = |o: &RegisteredOption| {
            o.builtin && (o.def.is(opt.short()) || o.def.is(opt.long()))
        };

        self.check_unique(&opt, shadows)?;
        if let Some(taken) = self
            .options
            .iter()
            .filter(|o| !shadows(*o))
            .find(|o| o.def.is(opt.short()) || o.def.is(opt.long()))
        {
            let name = taken.def.long().to_string();
            return Err(RegistrationError::DuplicateParameter {
                message: self.messages.duplicate_parameter(opt.label(), &name),
                name,
            });
        }

        let shadowed: Vec<String> = self
            .options
            .iter()
            .filter(|o| shadows(*o))
            .map(|o| o.def.attribute_name().to_string())
            .collect();
        if !shadowed.is_empty() {
            tracing::debug!(
                builtins = ?shadowed,
                spec = opt.raw_spec(),
                "user option replaces built-in"
            );
            self.options.retain(|o| !shadows(o));
            let names: Vec<&str> = shadowed.iter().map(String::as_str).collect();
            self.values = self.values.without(&names);
        }

        self.values
            .set_default(opt.attribute_name(), opt.default_value());
        self.options.push(RegisteredOption {
            def: opt,
            handler: None,
            builtin: false,
        });
        let index = self.options.len() - 1;
        Ok(OptionHandle {
            parser: self,
            index,
        })
    }

    /// Attribute names must be unique. Options matching `skip` are ignored.
    fn check_unique(
        &self,
        param: &dyn Parameter,
        skip: impl Fn(&RegisteredOption) -> bool,
    ) -> Result<(), RegistrationError> {
        let name = param.attribute_name();
        let taken = self
            .options
            .iter()
            .filter(|o| !skip(*o))
            .map(|o| o.def.attribute_name())
            .chain(self.arguments.iter().map(|a| a.attribute_name()))
            .any(|n| n == name);
        if taken {
            return Err(RegistrationError::DuplicateParameter {
                message: self.messages.duplicate_parameter(param.label(), name),
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Attribute names of the built-in options still registered.
    fn builtin_names(&self) -> Vec<&str> {
        self.options
            .iter()
            .filter(|o| o.builtin)
            .map(|o| o.def.attribute_name())
            .collect()
    }

    pub fn registered_options(&self) -> impl Iterator<Item = &OptionDef> {
        self.options.iter().map(|o| &o.def)
    }

    pub fn registered_arguments(&self) -> &[ArgumentDef] {
        &self.arguments
    }
}

// Parsing.
impl Parser {
    /// Parse a full argv. The first element is the program name and is skipped.
    pub fn parse<S: AsRef<str>>(&mut self, argv: &[S]) -> Result<Outcome, ParseError> {
        let args: Vec<&str> = argv.iter().skip(1).map(|s| s.as_ref()).collect();
        let tokens = Tokenizer::tokenize(args).map_err(|e| match e {
            TokenizeError::NestedGroup { token } => self.invalid_group(&token),
        })?;
        tracing::debug!(command = %self.name, tokens = tokens.len(), "parsing argv");

        self.check_groups(&tokens)?;

        let mut state = ParseState {
            pending: (0..self.arguments.len()).collect(),
            ..Default::default()
        };

        let mut i = 0;
        while i < tokens.len() {
            let token = &tokens[i];
            match token.kind() {
                TokenKind::Literal => i += 1,
                TokenKind::ShortOption | TokenKind::LongOption => {
                    let next = tokens
                        .get(i + 1)
                        .filter(|t| t.is_constant() || t.is_variadic(Some(Side::Open)));
                    match self.parse_option(token, next, &mut state)? {
                        Advance::One => i += 1,
                        Advance::Two => i += 2,
                        Advance::Stop(outcome) => return Ok(outcome),
                    }
                }
                TokenKind::Constant | TokenKind::VariadicOpen => {
                    self.parse_argument(token, &mut state);
                    i += 1;
                }
                TokenKind::VariadicClose => i += 1,
            }
        }

        self.validate()?;
        Ok(Outcome::Parsed)
    }

    /// Groups may only hold plain values. Checked up front so a bad group
    /// never leaves half-stored values behind.
    fn check_groups(&self, tokens: &[Token]) -> Result<(), ParseError> {
        let bad = tokens
            .iter()
            .filter(|t| t.is_variadic(Some(Side::Open)))
            .flat_map(|t| t.nested())
            .find(|child| !child.is_constant());
        match bad {
            Some(child) => Err(self.invalid_group(child.raw())),
            None => Ok(()),
        }
    }

    fn invalid_group(&self, token: &str) -> ParseError {
        ParseError::InvalidVariadicContent {
            message: self.messages.invalid_variadic_content(token),
            token: token.to_string(),
        }
    }

    fn parse_option(
        &mut self,
        token: &Token,
        next: Option<&Token>,
        state: &mut ParseState,
    ) -> Result<Advance, ParseError> {
        if state.argument_open {
            state.pending.pop_front();
            state.argument_open = false;
        }

        let flag = token.raw();
        let Some(idx) = self.options.iter().position(|o| o.def.is(flag)) else {
            return self.handle_unknown(flag, next, state);
        };

        let def = &self.options[idx].def;
        let attribute = def.attribute_name().to_string();
        state.last_variadic = def.variadic().then(|| attribute.clone());

        let value = if def.is_bool() {
            None
        } else {
            next.map(adjoining)
        };

        match self.options[idx].handler.as_ref().map(Handler::kind) {
            Some(HandlerKind::Help) => return Ok(Advance::Stop(self.show_help())),
            Some(HandlerKind::Version) => return Ok(Advance::Stop(self.show_version())),
            Some(HandlerKind::Verbosity) => {
                self.verbosity += 1;
                self.values.set(VERBOSITY, Value::Int(self.verbosity));
                return Ok(Advance::One);
            }
            Some(HandlerKind::Custom) => {
                let raw = raw_value(value.as_ref());
                if let Some(Handler::Custom(f)) = self.options[idx].handler.as_mut() {
                    if f(&raw) == Emit::Decline {
                        tracing::debug!(option = flag, "event declined value");
                        return Ok(Advance::One);
                    }
                }
            }
            None => {}
        }

        let def = &self.options[idx].def;
        let consumed = value.is_some();
        let normalized = normalize(def, value);
        if def.variadic() {
            self.values.append(&attribute, normalized);
        } else {
            self.values.set(&attribute, normalized);
        }

        Ok(if consumed { Advance::Two } else { Advance::One })
    }

    fn handle_unknown(
        &mut self,
        flag: &str,
        next: Option<&Token>,
        state: &mut ParseState,
    ) -> Result<Advance, ParseError> {
        state.last_variadic = None;

        if self.allow_unknown {
            let value = next.map(adjoining);
            let advance = if value.is_some() {
                Advance::Two
            } else {
                Advance::One
            };
            self.values
                .set(&camel_case(flag), raw_value(value.as_ref()));
            return Ok(advance);
        }

        if self.values.without(&self.builtin_names()).has_explicit() {
            return Err(ParseError::UnknownOption {
                message: self.messages.unknown_option(flag),
                option: flag.to_string(),
            });
        }

        tracing::debug!(option = flag, "unknown option before any value, showing help");
        Ok(Advance::Stop(self.show_help()))
    }

    fn parse_argument(&mut self, token: &Token, state: &mut ParseState) {
        let value = adjoining(token);
        let group = token.is_variadic(Some(Side::Open));

        if let Some(attribute) = state.last_variadic.clone() {
            if let Some(reg) = self
                .options
                .iter()
                .find(|o| o.def.attribute_name() == attribute)
            {
                if !group {
                    tracing::debug!(
                        option = reg.def.long(),
                        value = token.raw(),
                        "bare value appended to variadic option; use [ ... ] instead"
                    );
                }
                let normalized = normalize(&reg.def, Some(value));
                self.values.append(&attribute, normalized);
                return;
            }
        }

        let Some(&idx) = state.pending.front() else {
            self.values.push_overflow(raw_value(Some(&value)));
            return;
        };

        let arg = &self.arguments[idx];
        let attribute = arg.attribute_name().to_string();
        let normalized = normalize(arg, Some(value));
        if arg.variadic() {
            self.values.append(&attribute, normalized);
            if group {
                state.pending.pop_front();
                state.argument_open = false;
            } else {
                state.argument_open = true;
            }
        } else {
            self.values.set(&attribute, normalized);
            state.pending.pop_front();
        }
    }

    fn validate(&self) -> Result<(), ParseError> {
        let options = self.options.iter().map(|o| &o.def as &dyn Parameter);
        let arguments = self.arguments.iter().map(|a| a as &dyn Parameter);

        for param in options.chain(arguments) {
            if !param.required() {
                continue;
            }
            let missing = self
                .values
                .get(param.attribute_name())
                .is_none_or(Value::is_empty);
            if missing {
                let label = param.label();
                let name = param.display_name().to_string();
                return Err(ParseError::MissingRequired {
                    message: self.messages.missing_required(label, &name),
                    label,
                    name,
                });
            }
        }
        Ok(())
    }
}

// Built-in behaviour and value access.
impl Parser {
    pub fn help_context(&self) -> HelpContext<'_> {
        HelpContext {
            name: &self.name,
            version: self.version.as_deref(),
            description: &self.description,
            arguments: &self.arguments,
            options: self.options.iter().map(|o| &o.def).collect(),
        }
    }

    pub fn help_text(&self) -> String {
        self.help.render(&self.help_context())
    }

    /// Print help and call the exit hook.
    pub fn show_help(&mut self) -> Outcome {
        let text = self.help_text();
        self.writer.write(&text);
        self.exit.exit(0);
        Outcome::Help
    }

    /// Print the version line and call the exit hook.
    pub fn show_version(&mut self) -> Outcome {
        let line = match self.version.as_deref().map(str::trim) {
            Some(v) if !v.is_empty() => format!("{} {v}", self.name),
            _ => self.name.clone(),
        };
        self.writer.writeln(&line);
        self.exit.exit(0);
        Outcome::Version
    }

    /// How many times `-v` was given.
    pub fn verbosity(&self) -> i64 {
        self.verbosity
    }

    /// Value for an attribute name (defaults included).
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Extra positional argument by encounter order.
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.values.get_index(index)
    }

    /// All values. With `with_defaults == false` the built-in `help`,
    /// `version` and `verbosity` entries are left out.
    pub fn values(&self, with_defaults: bool) -> Values {
        if with_defaults {
            self.values.clone()
        } else {
            self.values.without(&self.builtin_names())
        }
    }
}

/// Value a token offers to whatever consumes it. Groups are always lists.
fn adjoining(token: &Token) -> TokenValue<'_> {
    if token.is_variadic(Some(Side::Open)) {
        TokenValue::List(token.nested().iter().map(Token::raw).collect())
    } else {
        token.value()
    }
}

fn raw_value(value: Option<&TokenValue<'_>>) -> Value {
    match value {
        None => Value::Null,
        Some(TokenValue::Scalar(s)) => Value::from(*s),
        Some(TokenValue::List(items)) => {
            Value::List(items.iter().map(|s| Value::from(*s)).collect())
        }
    }
}
