pub(crate) mod catalog;

#[cfg(test)]
mod proofs;
