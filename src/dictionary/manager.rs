//! Dictionary open, close, remove and rename

use std::fmt;

use crate::document::Document;
use crate::engine::{Engine, EngineDictionary, EngineEnv, DICTIONARY_MODE};
use crate::env::Environment;
use crate::errors::{
    classify, classify_open, fatal, status, EngineResultExt, ErrorCode, StoreError, StoreResult,
};
use crate::keys::KeyOrdering;
use crate::observability::{log_event_with_fields, trace_event, Event, Logger};

use super::options::DictionaryOptions;
use super::txn::{EphemeralTxn, TxnContext};

type EnvOf<E> = <E as Engine>::Env;
type TxnOf<E> = <EnvOf<E> as EngineEnv>::Txn;
type HandleOf<E> = <EnvOf<E> as EngineEnv>::Dictionary;

/// An open dictionary bound to its ordering
pub struct Dictionary<D> {
    name: String,
    ordering: KeyOrdering,
    handle: D,
}

impl<D> Dictionary<D> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ordering(&self) -> KeyOrdering {
        self.ordering
    }

    /// The engine handle, for reads and writes
    pub fn handle(&self) -> &D {
        &self.handle
    }
}

impl<D> fmt::Debug for Dictionary<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dictionary")
            .field("name", &self.name)
            .field("ordering", &self.ordering)
            .finish()
    }
}

/// Table lifecycle against an open environment
pub struct DictionaryManager<'e, E: Engine> {
    env: &'e Environment<E>,
}

impl<'e, E: Engine> DictionaryManager<'e, E> {
    pub fn new(env: &'e Environment<E>) -> Self {
        Self { env }
    }

    /// Open dictionary `name`, creating it when `may_create` is set.
    ///
    /// Returns `Ok(None)` when the dictionary does not exist and may not be
    /// created. A stored descriptor that does not match `key_pattern`
    /// terminates the process, including on a creating open of a table that
    /// already exists.
    pub fn open<C>(
        &self,
        ctx: &C,
        name: &str,
        key_pattern: &Document,
        info: &Document,
        may_create: bool,
    ) -> StoreResult<Option<Dictionary<HandleOf<E>>>>
    where
        C: TxnContext<Txn = TxnOf<E>>,
    {
        let options = DictionaryOptions::from_info(info)?;
        if key_pattern.is_empty() {
            return Err(StoreError::invalid_key_pattern("key pattern must have at least one field")
                .with_details(format!("dictionary: {}", name)));
        }
        let ordering = KeyOrdering::from_key_pattern(key_pattern)?;
        trace_event(
            Event::DictionaryOptions,
            &[
                ("compression", options.compression.as_str()),
                ("dictionary", name),
                ("page_size", options.page_size.to_string().as_str()),
                ("read_page_size", options.read_page_size.to_string().as_str()),
            ],
        );

        let env = self.env.engine_env("dictionary_open")?;
        let mut handle = env.create_dictionary().or_classify()?;
        handle.set_read_page_size(options.read_page_size).or_classify()?;
        handle.set_page_size(options.page_size).or_classify()?;
        handle.set_compression(options.compression).or_classify()?;

        // A non-creating open under no transaction or a read-only one has
        // nothing to roll back and no locks to hold.
        let ephemeral = if !may_create && (!ctx.has_txn() || ctx.is_read_only()) {
            Some(EphemeralTxn::begin(env)?)
        } else {
            None
        };
        let txn = match ephemeral {
            Some(ref guard) => guard.txn(),
            None => ctx.txn(),
        };

        let created = match handle.open(txn, name, may_create, DICTIONARY_MODE) {
            Ok(created) => created,
            Err(status) => {
                let err = classify_open(status, may_create).with_details(format!("dictionary: {}", name));
                if err.code() == ErrorCode::DictionaryAbsent {
                    Logger::info(Event::DictionaryNotFound.as_str(), &[("dictionary", name)]);
                    return Ok(None);
                }
                return Err(err);
            }
        };

        // The descriptor is written once, when the table is created. An
        // existing table keeps its stored ordering and is verified below.
        if created {
            let descriptor = ordering.to_descriptor();
            handle.change_descriptor(txn, &descriptor).or_halt("change_descriptor");
            let pattern = key_pattern.to_string();
            trace_event(
                Event::DictionaryDescriptorSet,
                &[("dictionary", name), ("key_pattern", pattern.as_str())],
            );
        }
        verify_descriptor(&handle.descriptor(), &ordering, name, key_pattern);

        if let Some(guard) = ephemeral {
            guard.commit()?;
        }
        log_event_with_fields(Event::DictionaryOpened, &[("dictionary", name)]);
        Ok(Some(Dictionary {
            name: name.to_string(),
            ordering,
            handle,
        }))
    }

    pub fn close(&self, dictionary: Dictionary<HandleOf<E>>) -> StoreResult<()> {
        let name = dictionary.name;
        dictionary
            .handle
            .close()
            .map_err(|status| classify(status).with_details(format!("dictionary: {}", name)))
    }

    /// Remove `name` under the caller's transaction.
    ///
    /// A missing dictionary is reported as a user error.
    pub fn remove<C>(&self, ctx: &C, name: &str) -> StoreResult<()>
    where
        C: TxnContext<Txn = TxnOf<E>>,
    {
        let env = self.env.engine_env("dictionary_remove")?;
        match env.remove_dictionary(ctx.txn(), name) {
            Ok(()) => {
                log_event_with_fields(Event::DictionaryRemoved, &[("dictionary", name)]);
                Ok(())
            }
            Err(s) if s.code() == status::ENOENT => Err(StoreError::new(
                ErrorCode::DictionaryMissing,
                "dictionary to remove does not exist",
            )
            .with_status(s)
            .with_details(format!("dictionary: {}", name))),
            Err(s) => Err(classify(s).with_details(format!("dictionary: {}", name))),
        }
    }

    /// Rename `old` to `new` under the caller's transaction. Any engine
    /// failure terminates the process.
    pub fn rename<C>(&self, ctx: &C, old: &str, new: &str) -> StoreResult<()>
    where
        C: TxnContext<Txn = TxnOf<E>>,
    {
        let env = self.env.engine_env("dictionary_rename")?;
        if let Err(s) = env.rename_dictionary(ctx.txn(), old, new) {
            let err = StoreError::new(
                ErrorCode::RenameFailed,
                format!("dictionary rename failed: old {}, new {}, r = {}", old, new, s.code()),
            )
            .with_status(s);
            fatal::halt_on(&err, "rename_dictionary");
        }
        log_event_with_fields(Event::DictionaryRenamed, &[("new", new), ("old", old)]);
        Ok(())
    }
}

/// Why a stored descriptor does not match the expected ordering
pub(crate) fn descriptor_mismatch(stored: &[u8], expected: &KeyOrdering) -> Option<String> {
    if stored.len() != KeyOrdering::ENCODED_LEN {
        return Some(format!(
            "stored descriptor is {} bytes, expected {}",
            stored.len(),
            KeyOrdering::ENCODED_LEN
        ));
    }
    if stored != &expected.to_descriptor()[..] {
        return Some(format!(
            "stored descriptor {:02x?} does not match {}",
            stored, expected
        ));
    }
    None
}

fn verify_descriptor(stored: &[u8], expected: &KeyOrdering, name: &str, key_pattern: &Document) {
    if let Some(reason) = descriptor_mismatch(stored, expected) {
        let pattern = key_pattern.to_string();
        Logger::fatal(
            Event::DictionaryDescriptorMismatch.as_str(),
            &[
                ("dictionary", name),
                ("key_pattern", pattern.as_str()),
                ("reason", reason.as_str()),
            ],
        );
        let err = StoreError::new(ErrorCode::DescriptorMismatch, "bad dictionary descriptor on open")
            .with_details(format!("dictionary: {}, key pattern {}: {}", name, pattern, reason));
        fatal::halt_on(&err, "verify_descriptor");
    }
}
