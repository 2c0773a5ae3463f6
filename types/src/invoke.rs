//! Uniform invocation over callables of any arity.
//!
//! Each trait is implemented for every closure and fn item whose parameter
//! list matches a native tuple, so a wrapper can hold `F` and a tuple `T` and
//! call `f.invoke(t)` without knowing how many arguments `F` takes.

/// Invoke a callable once, consuming it.
pub trait InvokeOnce<Args> {
    type Output;

    fn invoke_once(self, args: Args) -> Self::Output;
}

/// Invoke a callable by shared reference.
pub trait Invoke<Args> {
    type Output;

    fn invoke(&self, args: Args) -> Self::Output;
}

/// Invoke a "try"-shaped callable: it reports success through its return
/// value `S` and writes the produced value through a trailing `&mut R`.
///
/// This is the shape of `fn try_parse(input: &str, out: &mut u16) -> bool`.
pub trait InvokeTester<Args, R, S> {
    fn invoke_tester(&self, args: Args, out: &mut R) -> S;
}

macro_rules! impl_invoke {
    ($($name:ident),*) => {
        impl<Func, Out, $($name),*> InvokeOnce<($($name,)*)> for Func
        where
            Func: FnOnce($($name),*) -> Out,
        {
            type Output = Out;

            #[allow(non_snake_case)]
            fn invoke_once(self, ($($name,)*): ($($name,)*)) -> Out {
                self($($name),*)
            }
        }

        impl<Func, Out, $($name),*> Invoke<($($name,)*)> for Func
        where
            Func: Fn($($name),*) -> Out,
        {
            type Output = Out;

            #[allow(non_snake_case)]
            fn invoke(&self, ($($name,)*): ($($name,)*)) -> Out {
                self($($name),*)
            }
        }

        impl<Func, Res, Succ, $($name),*> InvokeTester<($($name,)*), Res, Succ> for Func
        where
            Func: Fn($($name,)* &mut Res) -> Succ,
        {
            #[allow(non_snake_case)]
            fn invoke_tester(&self, ($($name,)*): ($($name,)*), out: &mut Res) -> Succ {
                self($($name,)* out)
            }
        }
    };
}

impl_invoke!();
impl_invoke!(A);
impl_invoke!(A, B);
impl_invoke!(A, B, C);
impl_invoke!(A, B, C, D);
impl_invoke!(A, B, C, D, E);
impl_invoke!(A, B, C, D, E, F);
impl_invoke!(A, B, C, D, E, F, G);
impl_invoke!(A, B, C, D, E, F, G, H);
impl_invoke!(A, B, C, D, E, F, G, H, I);
impl_invoke!(A, B, C, D, E, F, G, H, I, J);
impl_invoke!(A, B, C, D, E, F, G, H, I, J, K);
impl_invoke!(A, B, C, D, E, F, G, H, I, J, K, L);
