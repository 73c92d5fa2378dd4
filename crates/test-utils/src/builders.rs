use prun::config::PoolConfig;
use prun::exec::CommandSpec;

/// Builder for `CommandSpec` to simplify test setup.
pub struct CommandSpecBuilder {
    name: String,
    args: Vec<String>,
}

impl CommandSpecBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            args: Vec::new(),
        }
    }

    /// `sh -c <script>`, for commands that need shell features.
    pub fn shell(script: &str) -> Self {
        Self::new("sh").arg("-c").arg(script)
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.args.push(arg.to_string());
        self
    }

    pub fn build(self) -> CommandSpec {
        CommandSpec::new(self.name, self.args)
    }
}

/// Builder for `PoolConfig`. Defaults to one job, one worker, no template.
pub struct PoolConfigBuilder {
    config: PoolConfig,
}

impl PoolConfigBuilder {
    pub fn new(command: CommandSpec) -> Self {
        Self {
            config: PoolConfig {
                total: 1,
                concurrency: 1,
                index_template: String::new(),
                command,
            },
        }
    }

    pub fn total(mut self, total: u64) -> Self {
        self.config.total = total;
        self
    }

    pub fn concurrency(mut self, concurrency: u64) -> Self {
        self.config.concurrency = concurrency;
        self
    }

    pub fn index_template(mut self, token: &str) -> Self {
        self.config.index_template = token.to_string();
        self
    }

    pub fn build(self) -> PoolConfig {
        self.config
    }
}
