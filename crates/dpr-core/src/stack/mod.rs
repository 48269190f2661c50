pub mod reducer;
pub mod temporal;

pub use reducer::{
    reduce_stack, reduce_stack_parallel, ReducerState, StackReducer, StackResult, TemporalOutput,
};
pub use temporal::{temporal_mean, temporal_variance, TemporalAccumulator};
