//! PHY-adjacent components: AGC, CQI, MIMO codebook selection, the PLCF
//! decoder, the HARQ process pool, and contracts for external collaborators.

pub mod agc;
pub mod cqi;
pub mod external;
pub mod harq;
pub mod mimo;
pub mod plcf;

pub use agc::{AgcConfig, AgcRx, AgcTx, RxMode};
pub use cqi::CqiLut;
pub use external::{MacLowPhy, PccReport, PdcReport, RxSynced};
pub use harq::{FinalizePolicy, HarqEntry, HarqKey, HarqProcessPool};
pub use mimo::{
    select_codebook_index, select_reciprocal_codebook_index, AggregationMetric, ChannelEstimate, CodebookEntry,
};
pub use plcf::{Plcf10, Plcf2, PlcfDecoder};
