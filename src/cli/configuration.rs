use {
    llgen::{Category, FrontendOptions, LexerOptions, LookaheadResolver, RecoveryPolicy, Resolvers},
    serde::Deserialize,
    std::{collections::BTreeMap, error, fmt, fs, path::Path},
};

#[derive(Debug, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub rules: Option<String>,
    pub grammar: Option<String>,
    pub start: Option<String>,
    pub lexer: LexerConfiguration,
    pub recovery: RecoveryConfiguration,
    pub resolvers: Vec<ResolverConfiguration>,
}

#[derive(Debug, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct LexerConfiguration {
    pub keyword_case_check: bool,
}

/// Overrides for the default recovery policy. An empty `categories` map keeps the
/// default categories.
#[derive(Debug, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct RecoveryConfiguration {
    pub terminator: Option<String>,
    pub separator: Option<String>,
    pub quote: Option<String>,
    pub block_open: Option<String>,
    pub block_close: Option<String>,
    pub string_symbol: Option<String>,
    pub categories: BTreeMap<String, String>,
}

#[derive(Debug, PartialEq, Deserialize)]
pub struct ResolverConfiguration {
    pub non_terminal: String,
    #[serde(default)]
    pub boundaries: Vec<String>,
    pub triggers: Vec<String>,
    pub on_trigger: Vec<String>,
    pub otherwise: Vec<String>,
}

impl Configuration {
    pub fn frontend_options(&self) -> Result<FrontendOptions, ConfigurationError> {
        Ok(FrontendOptions {
            start: self.start.clone(),
            lexer: LexerOptions {
                keyword_case_check: self.lexer.keyword_case_check,
            },
            recovery: self.recovery.policy()?,
            resolvers: self.resolvers(),
        })
    }

    /// The configured resolvers, or the built-in ones if none are configured.
    fn resolvers(&self) -> Resolvers {
        if self.resolvers.is_empty() {
            return Resolvers::default();
        }

        let mut resolvers = Resolvers::new();
        for conf in &self.resolvers {
            resolvers.register(
                &conf.non_terminal,
                LookaheadResolver::new(
                    &borrowed(&conf.boundaries),
                    &borrowed(&conf.triggers),
                    &borrowed(&conf.on_trigger),
                    &borrowed(&conf.otherwise),
                ),
            );
        }
        resolvers
    }
}

impl RecoveryConfiguration {
    fn policy(&self) -> Result<RecoveryPolicy, ConfigurationError> {
        let mut policy = RecoveryPolicy::default();

        let overrides = vec![
            (&self.terminator, &mut policy.terminator),
            (&self.separator, &mut policy.separator),
            (&self.quote, &mut policy.quote),
            (&self.block_open, &mut policy.block_open),
            (&self.block_close, &mut policy.block_close),
            (&self.string_symbol, &mut policy.string_symbol),
        ];
        for (value, target) in overrides {
            if let Some(value) = value {
                *target = value.clone();
            }
        }

        if !self.categories.is_empty() {
            let mut categories: BTreeMap<String, Category> = BTreeMap::new();
            for (non_terminal, category) in &self.categories {
                let category = category
                    .parse::<Category>()
                    .map_err(ConfigurationError::InvalidCategory)?;
                categories.insert(non_terminal.clone(), category);
            }
            policy.categories = categories;
        }

        Ok(policy)
    }
}

fn borrowed(items: &[String]) -> Vec<&str> {
    items.iter().map(|item| &item[..]).collect()
}

pub fn read_configuration(path: &Path) -> Result<Configuration, ConfigurationError> {
    let conf_str = match fs::read_to_string(path) {
        Ok(conf_str) => conf_str,
        Err(err) => {
            return Err(ConfigurationError::IOErr(format!(
                "Could not read configuration file \"{}\": {}",
                path.display(),
                err
            )));
        }
    };

    Ok(serde_yaml::from_str(&conf_str[..])?)
}

#[derive(Debug)]
pub enum ConfigurationError {
    IOErr(String),
    DeserializationErr(serde_yaml::Error),
    InvalidCategory(String),
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ConfigurationError::IOErr(ref err) => write!(f, "IO Error: {}", err),
            ConfigurationError::DeserializationErr(ref err) => {
                write!(f, "Failed to parse configuration file: {}", err)
            }
            ConfigurationError::InvalidCategory(ref err) => {
                write!(f, "Invalid recovery configuration: {}", err)
            }
        }
    }
}

impl error::Error for ConfigurationError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            ConfigurationError::DeserializationErr(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_yaml::Error> for ConfigurationError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigurationError::DeserializationErr(err)
    }
}
