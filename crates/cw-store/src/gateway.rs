use std::fs::{self, OpenOptions};
use std::net::{TcpStream, ToSocketAddrs};
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use cw_types::sparql_header;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{StoreError, StoreResult};
use crate::intern::{get_or_create, retrieve_one};
use crate::results::{ResultSet, Row};

const RESULTS_JSON: &str = "application/sparql-results+json";
const CONNECT_TIMEOUT: Duration = Duration::from_millis(500);

/// Process id of the launched store, kept in `db_dir` next to `store.log`.
pub const PID_FILE: &str = "store.pid";

/// Store process lifecycle and query/update transport.
///
/// The gateway can start the store as a managed subprocess, check whether it
/// is reachable, and stop a store it or an earlier gateway started; the
/// launched process id is recorded in [`PID_FILE`]. Every statement sent through
/// [`run_query`](Self::run_query) is prefixed with the namespace header.
pub struct StoreGateway {
    config: Config,
    client: Client,
    child: Mutex<Option<Child>>,
}

impl StoreGateway {
    /// Validate the configuration and build the HTTP client.
    pub fn new(config: &Config) -> StoreResult<Self> {
        config.validate()?;
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;
        Ok(Self {
            config: config.clone(),
            client,
            child: Mutex::new(None),
        })
    }

    /// The validated configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Dataset base URL.
    pub fn endpoint(&self) -> String {
        self.config.endpoint()
    }

    /// Whether the store's port accepts connections.
    pub fn alive(&self) -> bool {
        let addrs = match (self.config.host.as_str(), self.config.port).to_socket_addrs() {
            Ok(addrs) => addrs,
            Err(_) => return false,
        };
        addrs
            .into_iter()
            .any(|addr| TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT).is_ok())
    }

    /// Launch the store unless it is already reachable.
    pub fn start(&self) -> StoreResult<()> {
        if self.alive() {
            debug!(endpoint = %self.endpoint(), "store already running");
            return Ok(());
        }
        let launch = self.config.launch.as_ref().ok_or_else(|| {
            StoreError::Config("store is not running and no launch command is configured".into())
        })?;

        fs::create_dir_all(&self.config.db_dir)?;
        let log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.config.db_dir.join("store.log"))?;
        let child = Command::new(&launch.program)
            .args(&launch.args)
            .current_dir(&self.config.db_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::from(log.try_clone()?))
            .stderr(Stdio::from(log))
            .spawn()?;
        let pid = child.id();
        info!(pid, program = %launch.program.display(), "store launched");
        *self.child.lock().expect("lock poisoned") = Some(child);
        fs::write(self.pid_file(), pid.to_string())?;

        if self.poll(true) {
            info!(endpoint = %self.endpoint(), "store is up");
            return Ok(());
        }
        if let Some(mut child) = self.child.lock().expect("lock poisoned").take() {
            warn!(pid = child.id(), "store never became reachable, killing it");
            let _ = child.kill();
            child.wait()?;
        }
        self.forget_pid()?;
        Err(StoreError::StartTimeout {
            endpoint: self.endpoint(),
            attempts: self.config.poll_attempts,
        })
    }

    /// Stop a launched store. A store that is down is a no-op.
    ///
    /// A child of this gateway is killed directly; otherwise the process
    /// recorded in [`PID_FILE`] is sent `SIGTERM`. A reachable store with
    /// neither is [`StoreError::Unmanaged`].
    pub fn stop(&self) -> StoreResult<()> {
        if !self.alive() {
            return Ok(());
        }
        let child = self.child.lock().expect("lock poisoned").take();
        match child {
            Some(mut child) => {
                child.kill()?;
                child.wait()?;
            }
            None => self.signal_recorded()?,
        }
        self.forget_pid()?;
        if self.poll(false) {
            info!(endpoint = %self.endpoint(), "store stopped");
            Ok(())
        } else {
            Err(StoreError::StopTimeout {
                endpoint: self.endpoint(),
                attempts: self.config.poll_attempts,
            })
        }
    }

    /// Stop, then start.
    pub fn restart(&self) -> StoreResult<()> {
        self.stop()?;
        self.start()
    }

    /// Stop the store and wipe its database directory.
    pub fn clean(&self) -> StoreResult<()> {
        self.stop()?;
        if self.config.db_dir.exists() {
            fs::remove_dir_all(&self.config.db_dir)?;
        }
        fs::create_dir_all(&self.config.db_dir)?;
        info!(db_dir = %self.config.db_dir.display(), "store database wiped");
        Ok(())
    }

    fn pid_file(&self) -> std::path::PathBuf {
        self.config.db_dir.join(PID_FILE)
    }

    fn forget_pid(&self) -> StoreResult<()> {
        match fs::remove_file(self.pid_file()) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    fn signal_recorded(&self) -> StoreResult<()> {
        let unmanaged = || StoreError::Unmanaged {
            endpoint: self.endpoint(),
        };
        let pid: u32 = match fs::read_to_string(self.pid_file()) {
            Ok(text) => text.trim().parse().map_err(|_| unmanaged())?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(unmanaged()),
            Err(e) => return Err(e.into()),
        };
        let status = Command::new("kill").arg(pid.to_string()).status()?;
        if !status.success() {
            warn!(pid, "recorded store process could not be signalled");
            self.forget_pid()?;
            return Err(unmanaged());
        }
        info!(pid, "sent SIGTERM to recorded store process");
        Ok(())
    }

    fn poll(&self, up: bool) -> bool {
        for _ in 0..self.config.poll_attempts {
            if self.alive() == up {
                return true;
            }
            thread::sleep(self.config.poll_interval());
        }
        self.alive() == up
    }

    /// Send a query (or an update) and return the decoded result set.
    ///
    /// A failed request is retried once; a second failure is a transport
    /// error carrying the endpoint, status and statement text. Updates
    /// return an empty result set.
    pub fn run_query(&self, text: &str, update: bool) -> StoreResult<ResultSet> {
        let statement = format!("{}{text}", sparql_header());
        let mut status = 0;
        for attempt in 0..2 {
            match self.send(&statement, update) {
                Ok((200, body)) => {
                    if update {
                        return Ok(ResultSet::default());
                    }
                    return ResultSet::parse(&body);
                }
                Ok((code, body)) => {
                    status = code;
                    warn!(attempt, status, %body, "store request failed");
                }
                Err(e) => {
                    status = 0;
                    warn!(attempt, error = %e, "store request could not be sent");
                }
            }
        }
        Err(StoreError::Transport {
            endpoint: self.endpoint(),
            status,
            query: statement,
        })
    }

    fn send(&self, statement: &str, update: bool) -> StoreResult<(u16, String)> {
        let response = if update {
            self.client
                .post(format!("{}/update", self.endpoint()))
                .form(&[("update", statement)])
                .send()?
        } else {
            self.client
                .get(format!("{}/query", self.endpoint()))
                .query(&[("query", statement)])
                .header(ACCEPT, RESULTS_JSON)
                .send()?
        };
        let status = response.status().as_u16();
        Ok((status, response.text()?))
    }

    /// Get-or-create over raw statement text. Returns the single matching row.
    pub fn create(&self, query: &str, insert: &str) -> StoreResult<Row> {
        get_or_create(
            &self.config.intern_policy(),
            || Ok(self.run_query(query, false)?.rows()),
            || self.run_query(insert, true).map(|_| ()),
        )
    }

    /// Zero or one row; more than one distinct row is an integrity error.
    pub fn retrieve(&self, query: &str) -> StoreResult<Option<Row>> {
        retrieve_one(self.run_query(query, false)?.rows())
    }
}

impl std::fmt::Debug for StoreGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreGateway")
            .field("endpoint", &self.endpoint())
            .finish()
    }
}
